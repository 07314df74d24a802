//! The device module contains the chip type and its bus adapters.
//!
//! In most cases you will not need anything from here explicitly, the exposed types at the root of
//! the crate should be enough.

pub mod mcp23x17;
