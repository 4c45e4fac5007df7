//! Board-agnostic core logic for the pcfan driver
//!
//! Everything here is pure data and arithmetic; no bus access happens in
//! this crate:
//!
//! - Register map of the fan controller
//! - Scaled-value codecs (big-endian words, ×100 gains, ×10 trim scale)
//! - Bus address validation
//! - PI-mode state machine (setpoint vs. percent throttle)
//! - Driver configuration and status types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod address;
pub mod codec;
pub mod config;
pub mod mode;
pub mod registers;
pub mod status;

pub use address::{validate_address, InvalidAddress, DEFAULT_ADDRESS};
pub use config::{FanConfig, PiGains};
pub use mode::{ControlInput, PiMode};
pub use registers::{Register, Switch};
pub use status::FanStatus;
