use core::fmt::Debug;

/// Error type
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E: Sized + Debug> {
    /// No presence pulse after a 1-Wire reset
    NoPresence,
    /// Computed and stored checksum
    CrcMismatch(u8, u8),
    /// Expected and actual family code
    FamilyCodeMismatch(u8, u8),
    PortError(E),
}

impl<E: Sized + Debug> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::PortError(e)
    }
}
