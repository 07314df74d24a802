//! Support for the `MCP23017` and `MCP23S17` "16-Bit I/O Expander with Serial Interface"
//!
//! Datasheet: https://ww1.microchip.com/downloads/en/devicedoc/20001952c.pdf
//!
//! The MCP23x17 offers two eight-bit GPIO ports (banks A and B).  It has three
//! address pins, so eight devices can coexist on one bus.
//!
//! Both banks share a single configuration register, IOCON, which is visible at
//! one address per bank.
use crate::bus::I2cExt;
use crate::registers::{BankId, RegisterPort};
use crate::{Bank, Config, Driver, Error, PortMutex};

/// `MCP23x17` "16-Bit I/O Expander with Serial Interface" with I2C or SPI interface
///
/// A value of this type always refers to a chip that was reset successfully: all constructors run
/// [`Mcp23x17::reset()`] before returning.
pub struct Mcp23x17<M>(M);

impl<R> Mcp23x17<core::cell::RefCell<Driver<R>>>
where
    R: RegisterPort,
{
    /// Create a new instance on top of any register port, with the default configuration
    pub fn new(registers: R) -> Result<Self, Error<R::Error>> {
        Self::with_mutex(registers, Config::default())
    }

    pub fn with_config(registers: R, config: Config) -> Result<Self, Error<R::Error>> {
        Self::with_mutex(registers, config)
    }
}

impl<I2C> Mcp23x17<core::cell::RefCell<Driver<Mcp23017Bus<I2C>>>>
where
    I2C: crate::I2cBus,
{
    /// Create a new instance of the MCP23017 with I2C interface
    pub fn new_mcp23017(
        bus: I2C,
        a0: bool,
        a1: bool,
        a2: bool,
    ) -> Result<Self, Error<I2C::BusError>> {
        Self::new(Mcp23017Bus::new(bus, a0, a1, a2))
    }
}

impl<SPI> Mcp23x17<core::cell::RefCell<Driver<Mcp23S17Bus<SPI>>>>
where
    SPI: crate::SpiBus,
{
    /// Create a new instance of the MCP23S17 with SPI interface
    pub fn new_mcp23s17(
        bus: SPI,
        a0: bool,
        a1: bool,
        a2: bool,
    ) -> Result<Self, Error<SPI::BusError>> {
        Self::new(Mcp23S17Bus::new(bus, a0, a1, a2))
    }
}

impl<R, M> Mcp23x17<M>
where
    R: RegisterPort,
    M: PortMutex<Port = Driver<R>>,
{
    pub fn with_mutex(registers: R, config: Config) -> Result<Self, Error<R::Error>> {
        let mut chip = Self(crate::PortMutex::create(Driver::new(registers, config)));
        chip.reset()?;
        Ok(chip)
    }

    /// Bring the chip into its reset state.
    ///
    /// Writes IOCON exactly once (through bank A) and forgets all cached register values.  Needs
    /// exclusive access, so no pin can be claimed while this runs.
    pub fn reset(&mut self) -> Result<(), Error<R::Error>> {
        Ok(self.0.lock(|drv| drv.reset())?)
    }

    pub fn config(&self) -> Config {
        self.0.lock(|drv| drv.config())
    }

    pub fn bank(&self, id: BankId) -> Bank<'_, M> {
        Bank::new(id, &self.0)
    }

    pub fn banks(&self) -> [Bank<'_, M>; 2] {
        [self.bank(BankId::A), self.bank(BankId::B)]
    }

    /// Destroy the driver and return the register port.
    pub fn free(self) -> R {
        self.0.into_inner().into_port()
    }
}

pub struct Mcp23017Bus<I2C> {
    bus: I2C,
    addr: u8,
}

impl<I2C> Mcp23017Bus<I2C> {
    pub fn new(bus: I2C, a0: bool, a1: bool, a2: bool) -> Self {
        let addr = 0x20 | ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8);
        Self { bus, addr }
    }

    pub fn release(self) -> I2C {
        self.bus
    }
}

impl<I2C: crate::I2cBus> RegisterPort for Mcp23017Bus<I2C> {
    type Error = I2C::BusError;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        self.bus.read_reg(self.addr, address)
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.bus.write_reg(self.addr, address, value)
    }
}

/// The SPI variant frames every access with an opcode carrying the hardware address.
pub struct Mcp23S17Bus<SPI> {
    bus: SPI,
    addr: u8,
}

impl<SPI> Mcp23S17Bus<SPI> {
    pub fn new(bus: SPI, a0: bool, a1: bool, a2: bool) -> Self {
        let addr = ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8);
        Self { bus, addr }
    }

    pub fn release(self) -> SPI {
        self.bus
    }
}

impl<SPI: crate::SpiBus> RegisterPort for Mcp23S17Bus<SPI> {
    type Error = SPI::BusError;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        let mut val = [0; 1];
        let write = [0x40 | self.addr << 1 | 0x1, address];
        let mut tx = [
            embedded_hal::spi::Operation::Write(&write),
            embedded_hal::spi::Operation::Read(&mut val),
        ];
        self.bus.transaction(&mut tx)?;

        Ok(val[0])
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.bus.write(&[0x40 | self.addr << 1, address, value])?;

        Ok(())
    }
}
