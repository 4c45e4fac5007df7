//! pcfan Hardware Abstraction Layer
//!
//! This crate defines the bus transport the fan driver talks through. The
//! driver never touches a bus peripheral directly; it only sees the
//! transaction primitives of [`BusTransport`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pcfan-driver (register protocol)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pcfan-hal (this crate - BusTransport)  │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ I2cTransport  │       │ SimulatedFan  │
//! │ (embedded-hal)│       │  (host tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`bus::BusTransport`] - Transaction primitives
//! - [`i2c::I2cTransport`] - Adapter over any `embedded_hal::i2c::I2c`
//! - `mock::SimulatedFan` - In-memory peripheral (feature `mock`)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod i2c;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export key types at crate root for convenience
pub use bus::BusTransport;
pub use i2c::{BusError, I2cTransport};
#[cfg(any(test, feature = "mock"))]
pub use mock::SimulatedFan;
