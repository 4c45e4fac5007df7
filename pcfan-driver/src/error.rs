//! Driver errors

use pcfan_core::InvalidAddress;

/// An error the fan driver may encounter
///
/// `E` is the error type of the bus transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Transaction failed; the controller did not acknowledge
    Bus(E),
    /// Address outside 8..=119; nothing was sent
    InvalidAddress(u8),
    /// No controller answered the presence probe
    NotConnected,
    /// `begin` has not completed successfully
    NotReady,
    /// Controller returned fewer bytes than requested
    ShortRead,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Error<E> {
        Error::Bus(err)
    }
}

impl<E> Error<E> {
    /// Lift an address validation failure
    pub(crate) fn invalid_address(err: InvalidAddress) -> Self {
        Error::InvalidAddress(err.0)
    }

    /// Check whether this is a bus-level failure
    pub fn is_bus(&self) -> bool {
        matches!(self, Error::Bus(_))
    }
}
