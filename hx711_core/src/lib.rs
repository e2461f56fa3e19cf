#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! HX711 24-bit ADC driver (hardware-agnostic core).
//!
//! All chip access goes through the `hx711_traits` GPIO pin traits; a
//! production backend lives in `hx711_hardware`.
//!
//! ## Architecture
//!
//! - **Protocol**: reset/shutdown/ready-wait and the 24-bit bit-banged raw
//!   read with gain-select end pulses (`driver` module)
//! - **Filtering**: median-of-N with glitch rejection, zero/scale transform,
//!   moving average (`driver`, `filter`)
//! - **Background sampling**: continuous thread-owned sampling publishing a
//!   shared moving-average value (`sampler`)
//! - **Calibration**: operator-guided two-point routine (`calibrate`)

pub mod calibrate;
pub mod driver;
pub mod error;
pub mod filter;
pub mod mocks;
pub mod sampler;

pub use calibrate::AdjustValues;
pub use driver::{Hx711, sign_extend_24};
pub use error::{Error, Result};
pub use filter::MovingWindow;
pub use sampler::BackgroundSampler;
