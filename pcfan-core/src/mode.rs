//! PI-mode state machine
//!
//! The controller drives the fan from exactly one of two inputs:
//!
//! - PI loop enabled: the RPM setpoint register is the target
//! - PI loop disabled: the percent throttle register sets the PWM directly
//!
//! A write to the input that is not currently active is silently ignored by
//! the firmware, so the driver must switch modes before writing. The state
//! here is the driver's cached view of the PI-disable register.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::registers::Switch;

/// PI loop mode as last observed or commanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PiMode {
    /// PI loop tracks the RPM setpoint (power-on default)
    #[default]
    Enabled,
    /// PI loop off, fan follows percent throttle
    Disabled,
}

/// A control input the caller wants to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlInput {
    /// RPM setpoint for the PI loop
    Setpoint,
    /// Manual percent throttle
    Throttle,
}

impl ControlInput {
    /// Mode in which the firmware honours this input
    pub const fn required_mode(self) -> PiMode {
        match self {
            ControlInput::Setpoint => PiMode::Enabled,
            ControlInput::Throttle => PiMode::Disabled,
        }
    }
}

impl PiMode {
    /// Check whether the PI loop is running
    pub const fn is_enabled(self) -> bool {
        matches!(self, PiMode::Enabled)
    }

    /// Mode that must be entered before `input` can take effect
    ///
    /// Returns `None` when the current mode already accepts the input.
    pub fn transition_for(self, input: ControlInput) -> Option<PiMode> {
        let required = input.required_mode();
        if self == required {
            None
        } else {
            Some(required)
        }
    }

    /// Byte for the PI-disable register that selects this mode
    pub const fn register_value(self) -> u8 {
        self.as_switch().register_value()
    }

    /// Mode selected by a PI-disable register byte
    pub const fn from_register(value: u8) -> Self {
        match Switch::from_register(value) {
            Switch::On => PiMode::Enabled,
            Switch::Off => PiMode::Disabled,
        }
    }

    const fn as_switch(self) -> Switch {
        match self {
            PiMode::Enabled => Switch::On,
            PiMode::Disabled => Switch::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_enabled() {
        assert_eq!(PiMode::default(), PiMode::Enabled);
        assert!(PiMode::default().is_enabled());
    }

    #[test]
    fn test_setpoint_needs_enabled() {
        assert_eq!(PiMode::Enabled.transition_for(ControlInput::Setpoint), None);
        assert_eq!(
            PiMode::Disabled.transition_for(ControlInput::Setpoint),
            Some(PiMode::Enabled)
        );
    }

    #[test]
    fn test_throttle_needs_disabled() {
        assert_eq!(PiMode::Disabled.transition_for(ControlInput::Throttle), None);
        assert_eq!(
            PiMode::Enabled.transition_for(ControlInput::Throttle),
            Some(PiMode::Disabled)
        );
    }

    #[test]
    fn test_transition_reaches_required_mode() {
        let modes = [PiMode::Enabled, PiMode::Disabled];
        let inputs = [ControlInput::Setpoint, ControlInput::Throttle];

        for mode in modes {
            for input in inputs {
                let next = mode.transition_for(input).unwrap_or(mode);
                assert_eq!(next, input.required_mode());
            }
        }
    }

    #[test]
    fn test_register_encoding() {
        assert_eq!(PiMode::Enabled.register_value(), 0x00);
        assert_eq!(PiMode::Disabled.register_value(), 0xFF);
        assert_eq!(PiMode::from_register(0xFF), PiMode::Disabled);
        assert_eq!(PiMode::from_register(0x00), PiMode::Enabled);
    }
}
