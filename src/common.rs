#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Direction encoded by a pin's IODIR bit (1 = input).
    pub(crate) fn from_iodir_bit(bit: bool) -> Self {
        if bit {
            Direction::In
        } else {
            Direction::Out
        }
    }

    pub(crate) fn iodir_bit(self) -> bool {
        self == Direction::In
    }
}

/// When an interrupt-enabled pin raises an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptTrigger {
    /// On every change of the pin level.
    AnyChange,
    /// Whenever the pin level differs from the given level.
    CompareTo(bool),
}

/// Chip-wide settings written to IOCON during reset.
///
/// The default leaves every bit cleared, which is the power-on state of IOCON.  BANK and SEQOP are
/// not configurable: the driver relies on the interleaved BANK=0 register layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Logically OR the INTA and INTB outputs.
    pub mirror_interrupts: bool,
    /// Make the interrupt outputs open-drain.  Overrides `interrupt_active_high`.
    pub interrupt_open_drain: bool,
    pub interrupt_active_high: bool,
    /// Disable slew rate control on SDA.
    pub disable_slew_rate: bool,
}

impl Config {
    const MIRROR: u8 = 1 << 6;
    const DISSLW: u8 = 1 << 4;
    const ODR: u8 = 1 << 2;
    const INTPOL: u8 = 1 << 1;

    /// Value of the IOCON register for this configuration.
    pub fn iocon(&self) -> u8 {
        let mut iocon = 0x00;
        if self.mirror_interrupts {
            iocon |= Self::MIRROR;
        }
        if self.disable_slew_rate {
            iocon |= Self::DISSLW;
        }
        if self.interrupt_open_drain {
            iocon |= Self::ODR;
        }
        if self.interrupt_active_high {
            iocon |= Self::INTPOL;
        }
        iocon
    }
}
