//! Hardware-facing traits for the HX711 driver stack.
//!
//! The driver in `hx711_core` talks to the chip through these GPIO pin
//! traits; `hx711_hardware` provides the production backend. Trait-boundary
//! errors are type-erased for maximum flexibility and mapped to typed errors
//! by the core.

pub mod clock;

use std::time::{Duration, Instant};

pub use clock::{Clock, MonotonicClock};

/// Error type at the GPIO trait boundary.
pub type PinError = Box<dyn std::error::Error + Send + Sync>;

/// Logic level of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// A GPIO line fixed as an output at acquisition time.
pub trait OutputPin {
    fn write(&mut self, level: Level) -> Result<(), PinError>;
}

/// A GPIO line fixed as an input at acquisition time.
pub trait InputPin {
    fn read(&mut self) -> Result<Level, PinError>;

    /// Wait until the line reads `level` or `timeout` expires. Returns
    /// whether the level was reached before the call ended.
    ///
    /// The default implementation polls `read` in small intervals; backends
    /// with a real edge-wait primitive may override it.
    fn wait_for_level(&mut self, level: Level, timeout: Duration) -> Result<bool, PinError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.read()? == level {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(Duration::from_micros(200));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TogglingPin {
        reads_until_low: u32,
    }

    impl InputPin for TogglingPin {
        fn read(&mut self) -> Result<Level, PinError> {
            if self.reads_until_low == 0 {
                Ok(Level::Low)
            } else {
                self.reads_until_low -= 1;
                Ok(Level::High)
            }
        }
    }

    #[test]
    fn default_level_wait_sees_level_change() {
        let mut pin = TogglingPin { reads_until_low: 3 };
        let seen = pin
            .wait_for_level(Level::Low, Duration::from_millis(50))
            .unwrap();
        assert!(seen);
    }

    #[test]
    fn default_level_wait_times_out() {
        let mut pin = TogglingPin {
            reads_until_low: u32::MAX,
        };
        let seen = pin
            .wait_for_level(Level::Low, Duration::from_millis(2))
            .unwrap();
        assert!(!seen);
    }
}
