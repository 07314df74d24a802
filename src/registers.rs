//! Register map of the MCP23x17 and the [`RegisterPort`] contract.
//!
//! N.B.: All addresses are for BANK=0, which is the reset state of the chip (and this driver
//! never changes it).  In this layout the registers of both banks are interleaved: the bank A
//! instance of a register sits at an even address and the bank B instance right after it.
//!
//! For all registers, the reset value is 0x00, except for IODIR{A,B} which are 0xFF (making all
//! pins inputs) at reset.

/// Address-indexed access to the registers of one chip.
///
/// This is the only thing the rest of the driver needs from the bus.  [`Mcp23017Bus`] and
/// [`Mcp23S17Bus`] implement it on top of `embedded-hal` I2C and SPI devices.  Errors are passed
/// through unchanged, the driver never retries.
///
/// [`Mcp23017Bus`]: crate::dev::mcp23x17::Mcp23017Bus
/// [`Mcp23S17Bus`]: crate::dev::mcp23x17::Mcp23S17Bus
pub trait RegisterPort {
    type Error;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error>;
    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error>;
}

impl<T: RegisterPort + ?Sized> RegisterPort for &mut T {
    type Error = T::Error;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        T::read_register(self, address)
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        T::write_register(self, address, value)
    }
}

/// One of the two eight-pin banks of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BankId {
    A = 0,
    B = 1,
}

impl BankId {
    pub const ALL: [BankId; 2] = [BankId::A, BankId::B];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A logical register, independent of the bank it is accessed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// IODIR: input/output direction: 0=output; 1=input
    IoDir = 0x00,
    /// IPOL: input polarity: 0=register values match input pins; 1=opposite
    IPol = 0x02,
    /// GPINTEN: interrupt-on-change: 0=disable; 1=enable
    GpIntEn = 0x04,
    /// DEFVAL: default values for interrupt-on-change
    DefVal = 0x06,
    /// INTCON: interrupt-on-change config: 0=compare to previous pin value;
    ///   1=compare to corresponding bit in DEFVAL
    IntCon = 0x08,
    /// IOCON: configuration register, shared by both banks
    /// - Bit 7: BANK (which driver assumes stays 0)
    /// - Bit 6: MIRROR: if enabled, INTA and INTB are logically ORed
    /// - Bit 5: SEQOP: controls the incrementing function of the address pointer
    /// - Bit 4: DISSLW: disables slew rate control on SDA
    /// - Bit 3: HAEN: hardware address enable (MCP23S17 only)
    /// - Bit 2: ODR: interrupt pins are open-drain outputs (overrides INTPOL)
    /// - Bit 1: INTPOL: interrupt pin is 0=active-low or 1=active-high
    /// - Bit 0: unused
    IoCon = 0x0a,
    /// GPPU: GPIO pull-ups: enables weak internal pull-ups on each pin (when configured
    ///   as an input)
    GpPu = 0x0c,
    /// INTF: interrupt flags: 0=no interrupt pending; 1=corresponding pin caused interrupt
    IntF = 0x0e,
    /// INTCAP: interrupt captured value: reflects value of each pin at the time that they
    ///   caused an interrupt
    IntCap = 0x10,
    /// GPIO: reflects logic level on pins
    Gpio = 0x12,
    /// OLAT: output latches: sets state for pins configured as outputs
    OLat = 0x14,
}

impl Register {
    /// Bus address of this register as seen through `bank`.
    pub const fn address(self, bank: BankId) -> u8 {
        self as u8 | bank as u8
    }

    /// Whether both bank addresses of this register lead to the same physical register.
    pub const fn is_shared(self) -> bool {
        matches!(self, Register::IoCon)
    }

    /// Whether the chip changes this register on its own, so a cached value can go stale.
    pub const fn is_volatile(self) -> bool {
        matches!(self, Register::IntF | Register::IntCap | Register::Gpio)
    }

    /// Decode a bus address into the logical register and the bank it belongs to.
    pub fn decode(address: u8) -> Option<(Register, BankId)> {
        let reg = match address & !0x01 {
            0x00 => Register::IoDir,
            0x02 => Register::IPol,
            0x04 => Register::GpIntEn,
            0x06 => Register::DefVal,
            0x08 => Register::IntCon,
            0x0a => Register::IoCon,
            0x0c => Register::GpPu,
            0x0e => Register::IntF,
            0x10 => Register::IntCap,
            0x12 => Register::Gpio,
            0x14 => Register::OLat,
            _ => return None,
        };
        let bank = if address & 0x01 == 0 {
            BankId::A
        } else {
            BankId::B
        };
        Some((reg, bank))
    }
}

pub const IODIRA: u8 = Register::IoDir.address(BankId::A);
pub const IODIRB: u8 = Register::IoDir.address(BankId::B);
pub const IOCONA: u8 = Register::IoCon.address(BankId::A);
pub const IOCONB: u8 = Register::IoCon.address(BankId::B);
pub const GPIOA: u8 = Register::Gpio.address(BankId::A);
pub const GPIOB: u8 = Register::Gpio.address(BankId::B);
pub const OLATA: u8 = Register::OLat.address(BankId::A);
pub const OLATB: u8 = Register::OLat.address(BankId::B);

/// Number of distinct physical registers, i.e. of distinct canonical addresses.
pub(crate) const PHYSICAL_REGISTERS: usize = 21;

/// Map an address to the identity of the physical register behind it.
///
/// For aliased registers every alias maps to the bank A address; all other addresses map to
/// themselves.  Unknown addresses are returned unchanged.
pub fn canonical_address(address: u8) -> u8 {
    match Register::decode(address) {
        Some((reg, _)) if reg.is_shared() => reg.address(BankId::A),
        _ => address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_addresses_are_interleaved() {
        assert_eq!(IODIRA, 0x00);
        assert_eq!(IODIRB, 0x01);
        assert_eq!(IOCONA, 0x0a);
        assert_eq!(IOCONB, 0x0b);
        assert_eq!(Register::GpPu.address(BankId::B), 0x0d);
        assert_eq!(OLATB, 0x15);
    }

    #[test]
    fn iocon_aliases_share_one_identity() {
        assert_eq!(canonical_address(IOCONA), IOCONA);
        assert_eq!(canonical_address(IOCONB), IOCONA);
    }

    #[test]
    fn per_bank_registers_stay_distinct() {
        assert_ne!(canonical_address(IODIRA), canonical_address(IODIRB));
        assert_ne!(canonical_address(GPIOA), canonical_address(GPIOB));
        assert_eq!(canonical_address(0x40), 0x40);
    }

    #[test]
    fn decode_roundtrips_every_register() {
        let mut canonical = std::collections::BTreeSet::new();
        for address in 0x00..=0x15 {
            let (reg, bank) = Register::decode(address).unwrap();
            assert_eq!(reg.address(bank), address);
            canonical.insert(canonical_address(address));
        }
        assert_eq!(canonical.len(), PHYSICAL_REGISTERS);
        assert_eq!(Register::decode(0x16), None);
    }
}
