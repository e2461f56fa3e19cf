//! GPIO backends for the HX711 driver.
//!
//! One production backend (Raspberry Pi via `rppal`, behind the `hardware`
//! feature) plus an always-available simulated chip for development and CLI
//! runs off-target.

pub mod error;
pub mod sim;

#[cfg(feature = "hardware")]
pub mod rpi;

pub use error::HwError;
