use crate::registers::{canonical_address, RegisterPort, PHYSICAL_REGISTERS};

/// Write-through cache in front of a [`RegisterPort`].
///
/// Values are keyed by the canonical address of a register, so aliases of the same physical
/// register share one entry.  Every successful write updates the cache, reads are only sent to the
/// bus when the register is not cached yet.
pub struct RegisterShadow<R> {
    port: R,
    cache: heapless::LinearMap<u8, u8, PHYSICAL_REGISTERS>,
}

impl<R: RegisterPort> RegisterShadow<R> {
    pub fn new(port: R) -> Self {
        Self {
            port,
            cache: heapless::LinearMap::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.port
    }

    /// Last known value of the register at `address`, if any.
    pub fn cached(&self, address: u8) -> Option<u8> {
        self.cache.get(&canonical_address(address)).copied()
    }

    /// Forget everything, the next read of each register goes to the bus.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub fn read(&mut self, address: u8) -> Result<u8, R::Error> {
        match self.cached(address) {
            Some(value) => {
                log::trace!("shadow hit {:#04x} = {:#04x}", address, value);
                Ok(value)
            }
            None => self.read_through(address),
        }
    }

    /// Read from the bus even if the register is cached, and refresh the cache.
    pub fn read_through(&mut self, address: u8) -> Result<u8, R::Error> {
        let value = self.port.read_register(address)?;
        log::trace!("read {:#04x} = {:#04x}", address, value);
        self.remember(address, value);
        Ok(value)
    }

    pub fn write(&mut self, address: u8, value: u8) -> Result<(), R::Error> {
        self.port.write_register(address, value)?;
        log::trace!("wrote {:#04x} = {:#04x}", address, value);
        self.remember(address, value);
        Ok(())
    }

    /// Write `value` unless the physical register behind `address` is already known to hold it.
    ///
    /// Returns whether a bus write was issued.
    pub fn ensure(&mut self, address: u8, value: u8) -> Result<bool, R::Error> {
        if self.cached(address) == Some(value) {
            log::trace!("skipping write of {:#04x}, already {:#04x}", address, value);
            return Ok(false);
        }
        self.write(address, value)?;
        Ok(true)
    }

    /// Set (`set == true`) or clear the bits in `mask`, leaving all other bits as they are.
    pub fn update(&mut self, address: u8, mask: u8, set: bool) -> Result<(), R::Error> {
        let old = self.read(address)?;
        let new = if set { old | mask } else { old & !mask };
        self.write(address, new)
    }

    fn remember(&mut self, address: u8, value: u8) {
        if self.cache.insert(canonical_address(address), value).is_err() {
            log::warn!("not caching unknown register {:#04x}", address);
        }
    }
}
