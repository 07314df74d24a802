use crate::registers::{BankId, Register, RegisterPort};
use crate::shadow::RegisterShadow;
use crate::Config;

/// The mutable state of one chip: the register shadow and the set of claimed pins.
///
/// This lives inside the chip's [`PortMutex`](crate::PortMutex), all banks and pins reach it
/// through that mutex.
pub struct Driver<R> {
    shadow: RegisterShadow<R>,
    claimed: u16,
    config: Config,
}

fn pin_mask(bank: BankId, index: u8) -> u16 {
    assert!(index < 8);
    1 << (bank.index() * 8 + index as usize)
}

impl<R: RegisterPort> Driver<R> {
    pub fn new(port: R, config: Config) -> Self {
        Self {
            shadow: RegisterShadow::new(port),
            claimed: 0x0000,
            config,
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn into_port(self) -> R {
        self.shadow.into_inner()
    }

    /// Bring the chip into a known state.
    ///
    /// IOCON must be the very first register written, it decides how all following accesses are
    /// interpreted.  It is written through each bank's address but deduplicated by identity, so
    /// the physical register sees exactly one write.  Nothing else is written; the direction
    /// registers are pulled lazily on first use.
    ///
    /// # Panics
    /// In debug builds, when any pin is still claimed.  [`Mcp23x17::reset()`] rules this out by
    /// taking the chip mutably.
    ///
    /// [`Mcp23x17::reset()`]: crate::Mcp23x17::reset
    pub fn reset(&mut self) -> Result<(), R::Error> {
        debug_assert_eq!(self.claimed, 0, "reset with claimed pins");
        self.shadow.invalidate();
        let iocon = self.config.iocon();
        for bank in BankId::ALL {
            self.shadow.ensure(Register::IoCon.address(bank), iocon)?;
        }
        log::debug!("reset complete, IOCON = {:#04x}", iocon);
        Ok(())
    }

    pub fn read(&mut self, reg: Register, bank: BankId) -> Result<u8, R::Error> {
        if reg.is_volatile() {
            self.shadow.read_through(reg.address(bank))
        } else {
            self.shadow.read(reg.address(bank))
        }
    }

    pub fn write(&mut self, reg: Register, bank: BankId, value: u8) -> Result<(), R::Error> {
        self.shadow.write(reg.address(bank), value)
    }

    pub fn read_bit(&mut self, reg: Register, bank: BankId, index: u8) -> Result<bool, R::Error> {
        Ok(self.read(reg, bank)? & (1 << index) != 0)
    }

    /// Change a single bit of a bank register, all other bits keep their value.
    pub fn write_bit(
        &mut self,
        reg: Register,
        bank: BankId,
        index: u8,
        set: bool,
    ) -> Result<(), R::Error> {
        assert!(index < 8);
        self.shadow.update(reg.address(bank), 1 << index, set)
    }

    /// Set the bits in `mask_high`, clear the ones in `mask_low` with a single register write.
    pub fn write_bits(
        &mut self,
        reg: Register,
        bank: BankId,
        mask_high: u8,
        mask_low: u8,
    ) -> Result<(), R::Error> {
        let value = (self.read(reg, bank)? | mask_high) & !mask_low;
        self.write(reg, bank, value)
    }
}

/// Bookkeeping of which pins are currently claimed.
///
/// Claims never touch the bus, so this does not depend on the register port.
pub trait PinClaims {
    fn is_claimed(&self, bank: BankId, index: u8) -> bool;

    /// Mark a pin as claimed.  Returns `false` (and changes nothing) if it already was.
    fn claim(&mut self, bank: BankId, index: u8) -> bool;

    /// Mark a pin as free again.  Returns `false` (and changes nothing) if it was not claimed.
    fn release(&mut self, bank: BankId, index: u8) -> bool;
}

impl<R> PinClaims for Driver<R> {
    fn is_claimed(&self, bank: BankId, index: u8) -> bool {
        self.claimed & pin_mask(bank, index) != 0
    }

    fn claim(&mut self, bank: BankId, index: u8) -> bool {
        let mask = pin_mask(bank, index);
        if self.claimed & mask != 0 {
            return false;
        }
        self.claimed |= mask;
        true
    }

    fn release(&mut self, bank: BankId, index: u8) -> bool {
        let mask = pin_mask(bank, index);
        if self.claimed & mask == 0 {
            return false;
        }
        self.claimed &= !mask;
        true
    }
}
