//! Fan controller register map
//!
//! The register file is 17 bytes long. Multi-byte fields are big-endian and
//! the register pointer auto-increments, so adjacent fields (Kp then Ki) can
//! be written in one transaction.
//!
//! | Addr | Width | Field |
//! |------|-------|-------|
//! | 0x00 | 1 | Device address |
//! | 0x01 | 1 | Fan power gate (0xFF = off) |
//! | 0x02 | 2 | PI setpoint in RPM |
//! | 0x04 | 2 | Kp, signed ×100 |
//! | 0x06 | 2 | Ki, signed ×100 |
//! | 0x08 | 1 | Tach pulses per rotation |
//! | 0x09 | 2 | Tachometer RPM |
//! | 0x0B | 2 | PI output (20-320) |
//! | 0x0D | 1 | PI loop disable (0xFF = disabled) |
//! | 0x0E | 1 | Percent throttle |
//! | 0x0F | 1 | Trimpot scale, signed ×10 |
//! | 0x10 | 1 | Trimpot disable (0xFF = disabled) |

/// Register addresses
pub mod reg {
    /// Device bus address
    pub const WIRE_ADDR: u8 = 0x00;
    /// Fan power gate (controller board only)
    pub const FAN_ENABLE: u8 = 0x01;
    /// PI controller setpoint in RPM
    pub const SETPOINT_RPM: u8 = 0x02;
    /// PI proportional term
    pub const KP_VALUE: u8 = 0x04;
    /// PI integral term
    pub const KI_VALUE: u8 = 0x06;
    /// Tachometer pulses per rotation
    pub const FAN_TACH_DIVIDER: u8 = 0x08;
    /// Measured fan speed
    pub const FAN_ACTUAL_RPM: u8 = 0x09;
    /// Last PI controller output
    pub const PI_OUT: u8 = 0x0B;
    /// PI loop disable switch
    pub const PI_LOOP_DISABLE: u8 = 0x0D;
    /// Fan speed as percent of maximum
    pub const PROPORTIONAL_THROTTLE: u8 = 0x0E;
    /// Trimpot multiplier (controller board only)
    pub const TRIMMER_SCALE: u8 = 0x0F;
    /// Trimpot disable switch (controller board only)
    pub const TRIMMER_DISABLE: u8 = 0x10;
}

/// A register on the fan controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Device bus address; writing it moves the controller
    Address,
    /// Fan power gate (controller board only)
    FanEnable,
    /// PI setpoint in RPM, 16-bit
    SetpointRpm,
    /// Proportional gain, signed 16-bit ×100
    Kp,
    /// Integral gain, signed 16-bit ×100
    Ki,
    /// Tachometer pulses per rotation
    TachDivider,
    /// Measured fan speed in RPM, 16-bit, read-only
    ActualRpm,
    /// Last PI controller output, 16-bit, read-only
    PiOut,
    /// PI loop disable switch
    PiDisable,
    /// Fan speed as percent of maximum
    PercentThrottle,
    /// Trimpot multiplier, signed ×10 (controller board only)
    TrimmerScale,
    /// Trimpot disable switch (controller board only)
    TrimmerDisable,
}

impl Register {
    /// Register address on the wire
    pub const fn addr(self) -> u8 {
        match self {
            Register::Address => reg::WIRE_ADDR,
            Register::FanEnable => reg::FAN_ENABLE,
            Register::SetpointRpm => reg::SETPOINT_RPM,
            Register::Kp => reg::KP_VALUE,
            Register::Ki => reg::KI_VALUE,
            Register::TachDivider => reg::FAN_TACH_DIVIDER,
            Register::ActualRpm => reg::FAN_ACTUAL_RPM,
            Register::PiOut => reg::PI_OUT,
            Register::PiDisable => reg::PI_LOOP_DISABLE,
            Register::PercentThrottle => reg::PROPORTIONAL_THROTTLE,
            Register::TrimmerScale => reg::TRIMMER_SCALE,
            Register::TrimmerDisable => reg::TRIMMER_DISABLE,
        }
    }

    /// Field width in bytes
    pub const fn width(self) -> usize {
        match self {
            Register::SetpointRpm
            | Register::Kp
            | Register::Ki
            | Register::ActualRpm
            | Register::PiOut => 2,
            _ => 1,
        }
    }

    /// Present only on the fan controller board, not the blower
    pub const fn controller_only(self) -> bool {
        matches!(
            self,
            Register::FanEnable | Register::TrimmerScale | Register::TrimmerDisable
        )
    }
}

/// Value of a one-byte on/off register
///
/// The firmware treats 0xFF as "off"/"disabled" and 0x00 as "on"/"enabled";
/// nothing else is ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Switch {
    /// Feature active (0x00)
    On,
    /// Feature inactive (0xFF)
    Off,
}

impl Switch {
    /// Byte written to the register
    pub const fn register_value(self) -> u8 {
        match self {
            Switch::On => 0x00,
            Switch::Off => 0xFF,
        }
    }

    /// Decode a register byte; anything non-zero reads as off
    pub const fn from_register(value: u8) -> Self {
        if value == 0 {
            Switch::On
        } else {
            Switch::Off
        }
    }
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on {
            Switch::On
        } else {
            Switch::Off
        }
    }
}
