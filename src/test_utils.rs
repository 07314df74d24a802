//! In-memory register store used by the unit tests.

use crate::registers::{canonical_address, RegisterPort, IODIRA, IODIRB};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeBusError;

struct State {
    registers: [u8; 0x16],
    writes: Vec<(u8, u8)>,
    reads: Vec<u8>,
    fail_writes: bool,
    fail_reads: bool,
}

/// Fake chip with power-on register values.  Clones share the same registers, so a test can keep
/// one handle for inspection while the driver owns another.
#[derive(Clone)]
pub struct FakeRegisters(Rc<RefCell<State>>);

impl FakeRegisters {
    pub fn new() -> Self {
        let mut registers = [0x00; 0x16];
        registers[IODIRA as usize] = 0xff;
        registers[IODIRB as usize] = 0xff;
        Self(Rc::new(RefCell::new(State {
            registers,
            writes: Vec::new(),
            reads: Vec::new(),
            fail_writes: false,
            fail_reads: false,
        })))
    }

    /// Every `(address, value)` written so far, in order.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.0.borrow().writes.clone()
    }

    /// Every address read so far, in order.
    pub fn reads(&self) -> Vec<u8> {
        self.0.borrow().reads.clone()
    }

    pub fn value(&self, address: u8) -> u8 {
        self.0.borrow().registers[canonical_address(address) as usize]
    }

    /// Change a register behind the driver's back, like the hardware does for GPIO.
    pub fn set_value(&self, address: u8, value: u8) {
        self.0.borrow_mut().registers[canonical_address(address) as usize] = value;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.0.borrow_mut().fail_writes = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.0.borrow_mut().fail_reads = fail;
    }
}

impl RegisterPort for FakeRegisters {
    type Error = FakeBusError;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        let mut state = self.0.borrow_mut();
        if state.fail_reads {
            return Err(FakeBusError);
        }
        state.reads.push(address);
        Ok(state.registers[canonical_address(address) as usize])
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        if state.fail_writes {
            return Err(FakeBusError);
        }
        state.writes.push((address, value));
        state.registers[canonical_address(address) as usize] = value;
        Ok(())
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
