//! Driver configuration
//!
//! A [`FanConfig`] describes the settings a board wants applied after the
//! controller is found on the bus. Fields left as `None` keep whatever the
//! controller (or its trimpots) currently provides.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::address::{validate_address, InvalidAddress, DEFAULT_ADDRESS};

/// PI loop gains
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PiGains {
    /// Proportional gain (-327.68 to 327.67)
    pub kp: f32,
    /// Integral gain (-327.68 to 327.67)
    pub ki: f32,
}

impl PiGains {
    /// Create a gain pair
    pub const fn new(kp: f32, ki: f32) -> Self {
        Self { kp, ki }
    }
}

/// Fan controller configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FanConfig {
    /// 7-bit bus address of the controller
    pub address: u8,
    /// Tachometer pulses per rotation (usually 2)
    pub tach_divider: Option<u8>,
    /// PI gains; writing them overrides the onboard trimpots
    pub gains: Option<PiGains>,
    /// Trimpot multiplier (controller board only)
    pub trimmer_scale: Option<f32>,
    /// Whether the onboard trimpots are read (controller board only)
    pub trimmer_enabled: Option<bool>,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            tach_divider: None,
            gains: None,
            trimmer_scale: None,
            trimmer_enabled: None,
        }
    }
}

impl FanConfig {
    /// Configuration for a controller at `address` with nothing to apply
    pub fn at(address: u8) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// Check the configuration can be used as-is
    pub fn validate(&self) -> Result<(), InvalidAddress> {
        validate_address(self.address).map(|_| ())
    }

    /// Check whether anything would be written to the controller
    pub fn has_settings(&self) -> bool {
        self.tach_divider.is_some()
            || self.gains.is_some()
            || self.trimmer_scale.is_some()
            || self.trimmer_enabled.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FanConfig::default();
        assert_eq!(config.address, 0x36);
        assert!(config.validate().is_ok());
        assert!(!config.has_settings());
    }

    #[test]
    fn test_validate_rejects_reserved_address() {
        assert_eq!(FanConfig::at(0x78).validate(), Err(InvalidAddress(0x78)));
        assert_eq!(FanConfig::at(0x03).validate(), Err(InvalidAddress(0x03)));
        assert!(FanConfig::at(0x08).validate().is_ok());
    }

    #[test]
    fn test_has_settings() {
        let config = FanConfig {
            gains: Some(PiGains::new(1.5, 0.2)),
            ..FanConfig::default()
        };
        assert!(config.has_settings());
    }
}
