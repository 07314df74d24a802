use crate::registers::{BankId, Register, RegisterPort};
use crate::{Bank, Direction, Driver, Error, InterruptTrigger, PinClaims, PortMutex};
use embedded_hal::digital as hal_digital;

/// Representation of a port-expander pin.
///
/// `Pin` is not constructed directly, it is obtained from a [`Bank`].  A `Pin` is only a name for
/// one bit position of the chip; to actually use the pin it has to be claimed, which hands out a
/// [`ClaimedPin`].  At most one `ClaimedPin` exists per pin at any time.
pub struct Pin<'a, M> {
    bank: Bank<'a, M>,
    index: u8,
}

impl<'a, M> Pin<'a, M> {
    pub(crate) fn new(bank: Bank<'a, M>, index: u8) -> Self {
        Self { bank, index }
    }

    /// The bank this pin belongs to.
    pub fn bank(&self) -> Bank<'a, M> {
        self.bank
    }

    pub fn index(&self) -> u8 {
        self.index
    }
}

impl<'a, M> Pin<'a, M>
where
    M: PortMutex,
    M::Port: PinClaims,
{
    pub fn is_claimed(&self) -> bool {
        let (bank, index) = (self.bank.id(), self.index);
        self.bank.port().lock(|drv| drv.is_claimed(bank, index))
    }
}

impl<'a, R, M> Pin<'a, M>
where
    R: RegisterPort,
    M: PortMutex<Port = Driver<R>>,
{
    /// Take exclusive ownership of this pin.
    ///
    /// Claiming is pure bookkeeping, no register is touched.  The claim is given up when the
    /// returned [`ClaimedPin`] is dropped, also when that happens during error propagation or
    /// unwinding.  Fails with [`Error::AlreadyClaimed`] if the pin is currently claimed.
    pub fn claim(&self) -> Result<ClaimedPin<'a, M>, Error<R::Error>> {
        let (bank, index) = (self.bank.id(), self.index);
        if !self.bank.port().lock(|drv| drv.claim(bank, index)) {
            log::warn!("pin {:?}{} is already claimed", bank, index);
            return Err(Error::AlreadyClaimed { bank, index });
        }
        log::debug!("claimed pin {:?}{}", bank, index);
        Ok(ClaimedPin { pin: *self })
    }

    /// Run `f` with this pin claimed and release it afterwards.
    pub fn with_claimed<T, F>(&self, f: F) -> Result<T, Error<R::Error>>
    where
        F: FnOnce(&mut ClaimedPin<'a, M>) -> Result<T, Error<R::Error>>,
    {
        let mut pin = self.claim()?;
        f(&mut pin)
    }
}

impl<'a, M> Clone for Pin<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M> Copy for Pin<'a, M> {}

impl<'a, M> PartialEq for Pin<'a, M> {
    fn eq(&self, other: &Self) -> bool {
        self.bank == other.bank && self.index == other.index
    }
}

impl<'a, M> Eq for Pin<'a, M> {}

impl<'a, M> core::fmt::Debug for Pin<'a, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pin")
            .field("bank", &self.bank.id())
            .field("index", &self.index)
            .finish()
    }
}

/// Exclusive access to a claimed pin.
///
/// Every attribute of the pin is one bit of a bank register.  Reads are served from the register
/// shadow where possible, writes change only this pin's bit and go straight to the chip.
pub struct ClaimedPin<'a, M>
where
    M: PortMutex,
    M::Port: PinClaims,
{
    pin: Pin<'a, M>,
}

impl<'a, M> ClaimedPin<'a, M>
where
    M: PortMutex,
    M::Port: PinClaims,
{
    pub fn pin(&self) -> Pin<'a, M> {
        self.pin
    }

    pub fn bank(&self) -> Bank<'a, M> {
        self.pin.bank
    }

    pub fn index(&self) -> u8 {
        self.pin.index
    }

    /// Give up the claim now instead of at the end of the scope.
    pub fn release(self) {
        drop(self)
    }

    pub(crate) fn mask(&self) -> u8 {
        1 << self.pin.index
    }
}

impl<'a, R, M> ClaimedPin<'a, M>
where
    R: RegisterPort,
    M: PortMutex<Port = Driver<R>>,
{
    fn access<T, F>(&self, f: F) -> Result<T, Error<R::Error>>
    where
        F: FnOnce(&mut Driver<R>, BankId, u8) -> Result<T, R::Error>,
    {
        let (bank, index) = (self.pin.bank.id(), self.pin.index);
        Ok(self.pin.bank.port().lock(|drv| f(drv, bank, index))?)
    }

    pub fn direction(&self) -> Result<Direction, Error<R::Error>> {
        self.access(|drv, bank, index| {
            drv.read_bit(Register::IoDir, bank, index)
                .map(Direction::from_iodir_bit)
        })
    }

    pub fn set_direction(&mut self, direction: Direction) -> Result<(), Error<R::Error>> {
        self.access(|drv, bank, index| {
            drv.write_bit(Register::IoDir, bank, index, direction.iodir_bit())
        })
    }

    /// Read the level on the pin.  This always reads GPIO from the chip.
    pub fn is_high(&self) -> Result<bool, Error<R::Error>> {
        self.access(|drv, bank, index| drv.read_bit(Register::Gpio, bank, index))
    }

    pub fn is_low(&self) -> Result<bool, Error<R::Error>> {
        self.is_high().map(|b| !b)
    }

    /// Set the output latch of this pin.  Only has an effect on the pin while it is an output.
    pub fn set_value(&mut self, high: bool) -> Result<(), Error<R::Error>> {
        self.access(|drv, bank, index| drv.write_bit(Register::OLat, bank, index, high))
    }

    pub fn set_high(&mut self) -> Result<(), Error<R::Error>> {
        self.set_value(true)
    }

    pub fn set_low(&mut self) -> Result<(), Error<R::Error>> {
        self.set_value(false)
    }

    pub fn is_set_high(&self) -> Result<bool, Error<R::Error>> {
        self.access(|drv, bank, index| drv.read_bit(Register::OLat, bank, index))
    }

    pub fn is_set_low(&self) -> Result<bool, Error<R::Error>> {
        self.is_set_high().map(|b| !b)
    }

    pub fn toggle(&mut self) -> Result<(), Error<R::Error>> {
        self.access(|drv, bank, index| {
            let high = drv.read_bit(Register::OLat, bank, index)?;
            drv.write_bit(Register::OLat, bank, index, !high)
        })
    }

    pub fn pull_up(&self) -> Result<bool, Error<R::Error>> {
        self.access(|drv, bank, index| drv.read_bit(Register::GpPu, bank, index))
    }

    pub fn set_pull_up(&mut self, enable: bool) -> Result<(), Error<R::Error>> {
        self.access(|drv, bank, index| drv.write_bit(Register::GpPu, bank, index, enable))
    }

    pub fn inverted(&self) -> Result<bool, Error<R::Error>> {
        self.access(|drv, bank, index| drv.read_bit(Register::IPol, bank, index))
    }

    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), Error<R::Error>> {
        self.access(|drv, bank, index| drv.write_bit(Register::IPol, bank, index, inverted))
    }

    pub fn enable_interrupts(&mut self, trigger: InterruptTrigger) -> Result<(), Error<R::Error>> {
        self.access(|drv, bank, index| {
            match trigger {
                InterruptTrigger::AnyChange => {
                    drv.write_bit(Register::IntCon, bank, index, false)?;
                }
                InterruptTrigger::CompareTo(level) => {
                    drv.write_bit(Register::DefVal, bank, index, level)?;
                    drv.write_bit(Register::IntCon, bank, index, true)?;
                }
            }
            drv.write_bit(Register::GpIntEn, bank, index, true)
        })
    }

    pub fn disable_interrupts(&mut self) -> Result<(), Error<R::Error>> {
        self.access(|drv, bank, index| drv.write_bit(Register::GpIntEn, bank, index, false))
    }

    pub fn interrupts_enabled(&self) -> Result<bool, Error<R::Error>> {
        self.access(|drv, bank, index| drv.read_bit(Register::GpIntEn, bank, index))
    }
}

impl<'a, M> Drop for ClaimedPin<'a, M>
where
    M: PortMutex,
    M::Port: PinClaims,
{
    fn drop(&mut self) {
        let (bank, index) = (self.pin.bank.id(), self.pin.index);
        let released = self.pin.bank.port().lock(|drv| drv.release(bank, index));
        assert!(released, "released pin {:?}{} which was not claimed", bank, index);
        log::debug!("released pin {:?}{}", bank, index);
    }
}

impl<'a, M> core::fmt::Debug for ClaimedPin<'a, M>
where
    M: PortMutex,
    M::Port: PinClaims,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("ClaimedPin").field(&self.pin).finish()
    }
}

impl<'a, R, M> hal_digital::ErrorType for ClaimedPin<'a, M>
where
    R: RegisterPort,
    R::Error: core::fmt::Debug,
    M: PortMutex<Port = Driver<R>>,
{
    type Error = Error<R::Error>;
}

impl<'a, R, M> hal_digital::InputPin for ClaimedPin<'a, M>
where
    R: RegisterPort,
    R::Error: core::fmt::Debug,
    M: PortMutex<Port = Driver<R>>,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        ClaimedPin::is_high(self)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        ClaimedPin::is_low(self)
    }
}

impl<'a, R, M> hal_digital::OutputPin for ClaimedPin<'a, M>
where
    R: RegisterPort,
    R::Error: core::fmt::Debug,
    M: PortMutex<Port = Driver<R>>,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        ClaimedPin::set_low(self)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        ClaimedPin::set_high(self)
    }
}

impl<'a, R, M> hal_digital::StatefulOutputPin for ClaimedPin<'a, M>
where
    R: RegisterPort,
    R::Error: core::fmt::Debug,
    M: PortMutex<Port = Driver<R>>,
{
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        ClaimedPin::is_set_high(self)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        ClaimedPin::is_set_low(self)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        ClaimedPin::toggle(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::registers::{BankId, Register, IODIRA, IODIRB, OLATA};
    use crate::test_utils::{init_logging, FakeBusError, FakeRegisters};
    use crate::{Direction, Error, InterruptTrigger, Mcp23x17};

    #[test]
    fn a_pin_can_only_be_claimed_once_at_any_time() {
        init_logging();
        let chip = Mcp23x17::new(FakeRegisters::new()).unwrap();
        let pin = chip.bank(BankId::A).pin(3);

        let outer = pin.claim().unwrap();
        let nested = pin.claim();
        assert_eq!(
            nested.unwrap_err(),
            Error::AlreadyClaimed {
                bank: BankId::A,
                index: 3
            }
        );
        assert!(pin.is_claimed());
        assert_eq!(outer.index(), 3);
        drop(outer);

        assert!(!pin.is_claimed());
        assert!(pin.claim().is_ok());
    }

    #[test]
    fn a_pin_can_be_claimed_after_being_released() {
        let chip = Mcp23x17::new(FakeRegisters::new()).unwrap();
        let pin = chip.bank(BankId::A).pin(1);

        pin.claim().unwrap().release();
        let again = pin.claim().unwrap();
        assert_eq!(again.bank(), chip.bank(BankId::A));
        assert_eq!(again.index(), 1);
    }

    #[test]
    fn claims_do_not_touch_registers() {
        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();
        let writes = regs.writes();

        for pin in chip.bank(BankId::B).pins() {
            pin.claim().unwrap().release();
        }
        assert_eq!(regs.writes(), writes);
        assert!(regs.reads().is_empty());
    }

    #[test]
    fn claims_of_different_pins_are_independent() {
        let chip = Mcp23x17::new(FakeRegisters::new()).unwrap();

        let a3 = chip.bank(BankId::A).pin(3).claim().unwrap();
        let b3 = chip.bank(BankId::B).pin(3).claim().unwrap();
        let a4 = chip.bank(BankId::A).pin(4).claim().unwrap();
        assert_ne!(a3.pin(), b3.pin());
        assert_ne!(a3.pin(), a4.pin());
    }

    #[test]
    fn claim_is_released_on_error_propagation() {
        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();
        let pin = chip.bank(BankId::A).pin(5);

        regs.fail_writes(true);
        let res = pin.with_claimed(|p| {
            p.set_direction(Direction::Out)?;
            Ok(())
        });
        assert_eq!(res, Err(Error::Bus(FakeBusError)));
        assert!(!pin.is_claimed());
    }

    #[test]
    fn claim_is_released_on_panic() {
        let chip = Mcp23x17::new(FakeRegisters::new()).unwrap();
        let pin = chip.bank(BankId::B).pin(0);

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _claimed = pin.claim().unwrap();
            panic!("pin user failed");
        }));
        assert!(res.is_err());
        assert!(!pin.is_claimed());
    }

    #[test]
    #[should_panic(expected = "which was not claimed")]
    fn dropping_guard_of_unclaimed_pin_panics() {
        let chip = Mcp23x17::new(FakeRegisters::new()).unwrap();
        let guard = super::ClaimedPin {
            pin: chip.bank(BankId::A).pin(0),
        };
        drop(guard);
    }

    #[test]
    fn with_claimed_rejects_nested_claim() {
        let chip = Mcp23x17::new(FakeRegisters::new()).unwrap();
        let pin = chip.bank(BankId::A).pin(3);

        let nested = pin.with_claimed(|outer| {
            let nested = outer.pin().with_claimed(|_| Ok(()));
            assert!(outer.pin().is_claimed());
            Ok::<_, Error<FakeBusError>>(nested)
        });
        assert!(nested.unwrap().unwrap_err().is_already_claimed());
        assert!(pin.with_claimed(|_| Ok::<_, Error<FakeBusError>>(())).is_ok());
    }

    #[test]
    fn after_reset_all_pins_are_inputs() {
        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();

        for bank in chip.banks() {
            for pin in bank.pins() {
                let pin = pin.claim().unwrap();
                assert_eq!(pin.direction().unwrap(), Direction::In);
            }
        }
        // one bus read per bank, the other pins come from the shadow
        assert_eq!(regs.reads(), vec![IODIRA, IODIRB]);
    }

    #[test]
    fn direction_roundtrip_is_served_from_shadow() {
        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();
        let mut pin = chip.bank(BankId::A).pin(2).claim().unwrap();

        pin.set_direction(Direction::Out).unwrap();
        let reads = regs.reads();
        assert_eq!(pin.direction().unwrap(), Direction::Out);
        assert_eq!(regs.reads(), reads);
        assert_eq!(regs.value(IODIRA), 0b1111_1011);

        pin.set_direction(Direction::In).unwrap();
        assert_eq!(pin.direction().unwrap(), Direction::In);
        assert_eq!(regs.value(IODIRA), 0xff);
    }

    #[test]
    fn direction_change_keeps_other_pins() {
        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();
        let bank = chip.bank(BankId::B);

        let mut p0 = bank.pin(0).claim().unwrap();
        let mut p7 = bank.pin(7).claim().unwrap();
        p0.set_direction(Direction::Out).unwrap();
        p7.set_direction(Direction::Out).unwrap();
        p0.set_direction(Direction::In).unwrap();

        assert_eq!(p0.direction().unwrap(), Direction::In);
        assert_eq!(p7.direction().unwrap(), Direction::Out);
        assert_eq!(regs.value(IODIRB), 0b0111_1111);
        assert_eq!(regs.value(IODIRA), 0xff);
    }

    #[test]
    fn failed_direction_write_keeps_shadow() {
        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();
        let mut pin = chip.bank(BankId::A).pin(0).claim().unwrap();

        assert_eq!(pin.direction().unwrap(), Direction::In);
        regs.fail_writes(true);
        assert_eq!(
            pin.set_direction(Direction::Out),
            Err(Error::Bus(FakeBusError))
        );
        assert_eq!(pin.direction().unwrap(), Direction::In);
    }

    #[test]
    fn outputs_and_inputs() {
        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();
        let bank = chip.bank(BankId::A);

        let mut out = bank.pin(0).claim().unwrap();
        out.set_direction(Direction::Out).unwrap();
        out.set_high().unwrap();
        assert!(out.is_set_high().unwrap());
        out.toggle().unwrap();
        assert!(out.is_set_low().unwrap());
        out.set_value(true).unwrap();
        assert_eq!(regs.value(OLATA), 0b0000_0001);

        let input = bank.pin(6).claim().unwrap();
        regs.set_value(Register::Gpio.address(BankId::A), 0b0100_0000);
        assert!(input.is_high().unwrap());
        regs.set_value(Register::Gpio.address(BankId::A), 0b0000_0000);
        assert!(input.is_low().unwrap());
    }

    #[test]
    fn pull_up_and_polarity() {
        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();
        let mut pin = chip.bank(BankId::B).pin(4).claim().unwrap();

        assert!(!pin.pull_up().unwrap());
        pin.set_pull_up(true).unwrap();
        assert!(pin.pull_up().unwrap());
        pin.set_inverted(true).unwrap();
        assert!(pin.inverted().unwrap());

        assert_eq!(regs.value(Register::GpPu.address(BankId::B)), 0b0001_0000);
        assert_eq!(regs.value(Register::IPol.address(BankId::B)), 0b0001_0000);
    }

    #[test]
    fn interrupt_configuration() {
        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();
        let mut p1 = chip.bank(BankId::A).pin(1).claim().unwrap();
        let mut p2 = chip.bank(BankId::A).pin(2).claim().unwrap();

        p1.enable_interrupts(InterruptTrigger::CompareTo(true)).unwrap();
        p2.enable_interrupts(InterruptTrigger::AnyChange).unwrap();
        assert!(p1.interrupts_enabled().unwrap());

        assert_eq!(regs.value(Register::DefVal.address(BankId::A)), 0b0000_0010);
        assert_eq!(regs.value(Register::IntCon.address(BankId::A)), 0b0000_0010);
        assert_eq!(regs.value(Register::GpIntEn.address(BankId::A)), 0b0000_0110);

        p1.disable_interrupts().unwrap();
        assert!(!p1.interrupts_enabled().unwrap());
        assert_eq!(regs.value(Register::GpIntEn.address(BankId::A)), 0b0000_0100);
    }

    #[test]
    fn claimed_pin_is_an_embedded_hal_pin() {
        use embedded_hal::digital::{InputPin, OutputPin, StatefulOutputPin};

        fn blink<P: OutputPin + StatefulOutputPin>(p: &mut P) -> Result<bool, P::Error> {
            p.set_high()?;
            p.toggle()?;
            p.is_set_high()
        }

        let regs = FakeRegisters::new();
        let chip = Mcp23x17::new(regs.clone()).unwrap();
        let mut pin = chip.bank(BankId::A).pin(7).claim().unwrap();
        pin.set_direction(Direction::Out).unwrap();

        assert!(!blink(&mut pin).unwrap());
        regs.set_value(Register::Gpio.address(BankId::A), 0x80);
        assert!(InputPin::is_high(&mut pin).unwrap());
    }
}
