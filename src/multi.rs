use crate::registers::{BankId, Register, RegisterPort};
use crate::{ClaimedPin, Driver, Error, PortMutex};

/// Set multiple pins at the same time.
///
/// The usual method of setting multiple pins
///
/// ```no_run
/// # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// # let chip = mcp23x17_banks::Mcp23x17::new_mcp23017(i2c, false, false, false).unwrap();
/// # let bank = chip.bank(mcp23x17_banks::BankId::A);
/// # let mut io0 = bank.pin(0).claim().unwrap();
/// # let mut io1 = bank.pin(1).claim().unwrap();
/// io0.set_high().unwrap();
/// io1.set_low().unwrap();
/// ```
///
/// needs a read-modify-write of OLAT for every single pin, and the pins change state one after
/// the other.  `write_multiple()` collects all changes and writes OLAT once per bank that is
/// touched.
///
/// ## Example
/// ```no_run
/// # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// # let chip = mcp23x17_banks::Mcp23x17::new_mcp23017(i2c, false, false, false).unwrap();
/// # let bank = chip.bank(mcp23x17_banks::BankId::A);
/// # let mut io0 = bank.pin(0).claim().unwrap();
/// # let mut io1 = bank.pin(1).claim().unwrap();
/// mcp23x17_banks::write_multiple(
///     [&mut io0, &mut io1],
///     [true, false],
/// ).unwrap();
/// ```
///
/// An empty set of pins is a no-op.
///
/// # Panics
/// When the pins do not all belong to the same chip.
pub fn write_multiple<R, M, const N: usize>(
    pins: [&mut ClaimedPin<'_, M>; N],
    states: [bool; N],
) -> Result<(), Error<R::Error>>
where
    R: RegisterPort,
    M: PortMutex<Port = Driver<R>>,
{
    let mut mask_set_high = [0x00u8; 2];
    let mut mask_set_low = [0x00u8; 2];

    if N == 0 {
        return Ok(());
    }
    let port_driver = pins[0].bank().port();
    for (pin, state) in pins.iter().zip(states.iter()) {
        assert!(core::ptr::eq(pin.bank().port(), port_driver));
        let bank = pin.bank().index();
        if *state {
            mask_set_high[bank] |= pin.mask();
        } else {
            mask_set_low[bank] |= pin.mask();
        }
    }

    Ok(port_driver.lock(|drv| -> Result<(), R::Error> {
        for bank in BankId::ALL {
            let (high, low) = (mask_set_high[bank.index()], mask_set_low[bank.index()]);
            if high | low != 0 {
                drv.write_bits(Register::OLat, bank, high, low)?;
            }
        }
        Ok(())
    })?)
}

/// Read multiple pins at the same time.
///
/// Reading pins one after the other costs one bus transaction each and can miss or tear
/// simultaneous changes.  `read_multiple()` reads GPIO once per bank that is touched and answers
/// all pins from that snapshot.
///
/// ## Example
/// ```no_run
/// # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// # let chip = mcp23x17_banks::Mcp23x17::new_mcp23017(i2c, false, false, false).unwrap();
/// # let bank = chip.bank(mcp23x17_banks::BankId::A);
/// # let io0 = bank.pin(0).claim().unwrap();
/// # let io1 = bank.pin(1).claim().unwrap();
/// let values = mcp23x17_banks::read_multiple([&io0, &io1]).unwrap();
/// if values[0] {
///     // ...
/// } else if values[1] {
///     // ...
/// }
/// ```
///
/// An empty set of pins reads nothing.
///
/// # Panics
/// When the pins do not all belong to the same chip.
pub fn read_multiple<R, M, const N: usize>(
    pins: [&ClaimedPin<'_, M>; N],
) -> Result<[bool; N], Error<R::Error>>
where
    R: RegisterPort,
    M: PortMutex<Port = Driver<R>>,
{
    let mut touched = [false; 2];
    if N == 0 {
        return Ok([false; N]);
    }
    let port_driver = pins[0].bank().port();
    for pin in pins.iter() {
        assert!(core::ptr::eq(pin.bank().port(), port_driver));
        touched[pin.bank().index()] = true;
    }

    let levels = port_driver.lock(|drv| -> Result<[u8; 2], R::Error> {
        let mut levels = [0x00; 2];
        for bank in BankId::ALL {
            if touched[bank.index()] {
                levels[bank.index()] = drv.read(Register::Gpio, bank)?;
            }
        }
        Ok(levels)
    })?;

    let mut ret = [false; N];
    for (pin, state) in pins.iter().zip(ret.iter_mut()) {
        *state = levels[pin.bank().index()] & pin.mask() != 0;
    }

    Ok(ret)
}
