//! Bus address rules
//!
//! The controller accepts any 7-bit address outside the reserved blocks at
//! both ends of the address space.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Factory default address (7-bit, unshifted)
pub const DEFAULT_ADDRESS: u8 = 0x36;

/// Lowest address the device can be moved to
pub const MIN_ADDRESS: u8 = 8;

/// Highest address the device can be moved to
pub const MAX_ADDRESS: u8 = 119;

/// Address outside `MIN_ADDRESS..=MAX_ADDRESS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InvalidAddress(pub u8);

/// Check whether `address` may be assigned to the device
pub const fn is_valid_address(address: u8) -> bool {
    address >= MIN_ADDRESS && address <= MAX_ADDRESS
}

/// Pass `address` through if it is assignable
pub const fn validate_address(address: u8) -> Result<u8, InvalidAddress> {
    if is_valid_address(address) {
        Ok(address)
    } else {
        Err(InvalidAddress(address))
    }
}
