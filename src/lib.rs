//! Pin ownership and register shadowing for the MCP23017 / MCP23S17 port-expander.
//!
//! The chip has two banks of eight pins.  A [`Mcp23x17`] hands out [`Bank`]s, a bank hands out
//! [`Pin`]s, and a pin has to be claimed before it can be used.  A claim is exclusive and is given
//! up automatically when the [`ClaimedPin`] goes out of scope.
//!
//! ```
//! # use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
//! # let expectations = [
//! #     Transaction::write(0x20, vec![0x0a, 0x00]),
//! #     Transaction::write_read(0x20, vec![0x00], vec![0xff]),
//! #     Transaction::write(0x20, vec![0x00, 0xfe]),
//! # ];
//! # let mut i2c = Mock::new(&expectations);
//! use mcp23x17_banks::{BankId, Direction, Mcp23x17};
//!
//! let chip = Mcp23x17::new_mcp23017(i2c.clone(), false, false, false).unwrap();
//! let mut led = chip.bank(BankId::A).pin(0).claim().unwrap();
//! led.set_direction(Direction::Out).unwrap();
//!
//! // nobody else can take the pin while `led` is alive
//! assert!(chip.bank(BankId::A).pin(0).claim().is_err());
//! # drop(led);
//! # i2c.done();
//! ```
//!
//! All register accesses go through a write-through shadow, so querying the direction of all
//! eight pins of a bank costs a single bus read.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod bank;
mod bus;
mod common;
pub mod dev;
mod driver;
mod error;
mod multi;
mod mutex;
mod pin;
pub mod registers;
mod shadow;
#[cfg(test)]
mod test_utils;

pub use bank::{Bank, PINS_PER_BANK};
pub use bus::{I2cBus, SpiBus};
pub use common::{Config, Direction, InterruptTrigger};
pub use driver::{Driver, PinClaims};
pub use error::Error;
pub use multi::{read_multiple, write_multiple};
pub use mutex::PortMutex;
pub use pin::{ClaimedPin, Pin};
pub use registers::{BankId, RegisterPort};
pub use shadow::RegisterShadow;

pub use dev::mcp23x17::{Mcp23017Bus, Mcp23S17Bus, Mcp23x17};
