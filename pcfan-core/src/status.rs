//! Status snapshot

use crate::mode::PiMode;

/// Full scale of the PI controller output
pub const PI_OUT_MAX: u16 = 320;

/// One read of the controller's speed registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FanStatus {
    /// PI setpoint in RPM
    pub setpoint_rpm: u16,
    /// Tachometer reading in RPM
    pub actual_rpm: u16,
    /// Last PI output (20-320)
    pub pi_out: u16,
    /// Fan speed as percent of maximum
    pub percent_throttle: u8,
    /// Driver's cached PI mode at the time of the read
    pub pi_mode: PiMode,
}

impl FanStatus {
    /// Check whether the tachometer sees rotation
    pub fn is_spinning(&self) -> bool {
        self.actual_rpm > 0
    }

    /// Tachometer minus setpoint; only meaningful with the PI loop enabled
    pub fn rpm_error(&self) -> i32 {
        self.actual_rpm as i32 - self.setpoint_rpm as i32
    }

    /// PI output expressed as percent of full scale
    pub fn pi_out_percent(&self) -> u8 {
        let clamped = self.pi_out.min(PI_OUT_MAX) as u32;
        (clamped * 100 / PI_OUT_MAX as u32) as u8
    }
}
