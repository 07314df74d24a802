use crate::BankId;

/// Error type for all operations on banks and pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<BusError> {
    /// The register port failed.  The register shadow was left untouched.
    Bus(BusError),
    /// The pin is currently claimed by someone else.  The existing claim is unaffected.
    AlreadyClaimed { bank: BankId, index: u8 },
}

impl<BusError> Error<BusError> {
    pub fn is_already_claimed(&self) -> bool {
        matches!(self, Error::AlreadyClaimed { .. })
    }
}

impl<BusError> From<BusError> for Error<BusError> {
    fn from(value: BusError) -> Self {
        Error::Bus(value)
    }
}

impl<BusError: core::fmt::Debug> core::fmt::Display for Error<BusError> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "register port error: {:?}", e),
            Error::AlreadyClaimed { bank, index } => {
                write!(f, "pin {:?}{} is already claimed", bank, index)
            }
        }
    }
}

impl<BusError: core::fmt::Debug> embedded_hal::digital::Error for Error<BusError> {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

#[cfg(feature = "std")]
impl<BusError: core::fmt::Debug> std::error::Error for Error<BusError> {}
