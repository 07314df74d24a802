use crate::registers::{BankId, Register, RegisterPort};
use crate::{Driver, Error, Pin, PortMutex};

pub const PINS_PER_BANK: usize = 8;

/// One of the two eight-pin banks of a chip.
///
/// A `Bank` is a cheap handle into the chip, obtained from [`Mcp23x17::bank()`] or
/// [`Mcp23x17::banks()`].  Two handles compare equal when they refer to the same bank of the same
/// chip instance.
///
/// [`Mcp23x17::bank()`]: crate::Mcp23x17::bank
/// [`Mcp23x17::banks()`]: crate::Mcp23x17::banks
pub struct Bank<'a, M> {
    id: BankId,
    port: &'a M,
}

impl<'a, M> Bank<'a, M> {
    pub(crate) fn new(id: BankId, port: &'a M) -> Self {
        Self { id, port }
    }

    pub fn id(&self) -> BankId {
        self.id
    }

    pub fn index(&self) -> usize {
        self.id.index()
    }

    pub fn len(&self) -> usize {
        PINS_PER_BANK
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Handle for pin `index` of this bank.
    ///
    /// # Panics
    /// When `index` is 8 or larger.
    pub fn pin(&self, index: u8) -> Pin<'a, M> {
        assert!(
            (index as usize) < PINS_PER_BANK,
            "bank has only {} pins, got index {}",
            PINS_PER_BANK,
            index
        );
        Pin::new(*self, index)
    }

    pub fn pins(&self) -> [Pin<'a, M>; PINS_PER_BANK] {
        core::array::from_fn(|i| self.pin(i as u8))
    }

    pub(crate) fn port(&self) -> &'a M {
        self.port
    }
}

impl<'a, R, M> Bank<'a, M>
where
    R: RegisterPort,
    M: PortMutex<Port = Driver<R>>,
{
    /// Pins of this bank which caused an interrupt (INTF).
    pub fn interrupt_flags(&self) -> Result<u8, Error<R::Error>> {
        Ok(self.port.lock(|drv| drv.read(Register::IntF, self.id))?)
    }

    /// Pin levels captured at the time of the last interrupt (INTCAP).
    ///
    /// Reading this register clears the pending interrupt on the chip.
    pub fn interrupt_capture(&self) -> Result<u8, Error<R::Error>> {
        Ok(self.port.lock(|drv| drv.read(Register::IntCap, self.id))?)
    }
}

impl<'a, M> Clone for Bank<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M> Copy for Bank<'a, M> {}

impl<'a, M> PartialEq for Bank<'a, M> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.port, other.port) && self.id == other.id
    }
}

impl<'a, M> Eq for Bank<'a, M> {}

impl<'a, M> core::fmt::Debug for Bank<'a, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bank").field("id", &self.id).finish()
    }
}
