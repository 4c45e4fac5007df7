//! Register driver for the PI fan controller
//!
//! [`PcFan`] speaks the controller's register protocol over any
//! [`BusTransport`](pcfan_hal::BusTransport):
//!
//! - Connection management (probe, address reassignment)
//! - Typed register access with scaled-value encoding
//! - Automatic switching between RPM-setpoint and percent-throttle modes
//! - Controller-board extras (fan power gate, trimpots)
//!
//! On hardware the transport is usually an
//! [`I2cTransport`](pcfan_hal::I2cTransport) around the board's I2C bus:
//!
//! ```
//! use pcfan_driver::{PcFan, PiMode, DEFAULT_ADDRESS};
//! # use pcfan_hal::mock::SimulatedFan;
//! # let bus = SimulatedFan::new(DEFAULT_ADDRESS);
//! let mut fan = PcFan::new(bus);
//! fan.begin(DEFAULT_ADDRESS).unwrap();
//!
//! fan.set_fan_speed(2400).unwrap();
//! assert_eq!(fan.get_setpoint(), Ok(2400));
//!
//! // Switching to manual throttle turns the PI loop off
//! fan.set_percent_throttle(60).unwrap();
//! assert_eq!(fan.pi_mode(), PiMode::Disabled);
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the macros are visible to the other modules
#[macro_use]
mod fmt;

pub mod error;
pub mod fan;

pub use error::Error;
pub use fan::PcFan;

pub use pcfan_core::{FanConfig, FanStatus, PiGains, PiMode, DEFAULT_ADDRESS};
pub use pcfan_hal::{BusTransport, I2cTransport};
