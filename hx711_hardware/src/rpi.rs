//! Raspberry Pi GPIO backend over rppal.

use hx711_core::Hx711;
use hx711_traits::{InputPin, Level, OutputPin, PinError};
use rppal::gpio::Gpio;
use tracing::debug;

use crate::error::{HwError, Result};

pub struct RpiClockPin(rppal::gpio::OutputPin);

impl OutputPin for RpiClockPin {
    fn write(&mut self, level: Level) -> std::result::Result<(), PinError> {
        match level {
            Level::High => self.0.set_high(),
            Level::Low => self.0.set_low(),
        }
        Ok(())
    }
}

pub struct RpiDataPin(rppal::gpio::InputPin);

impl InputPin for RpiDataPin {
    fn read(&mut self) -> std::result::Result<Level, PinError> {
        Ok(if self.0.is_high() {
            Level::High
        } else {
            Level::Low
        })
    }
    // Data-ready detection uses the default polling wait; the chip holds the
    // line low for the whole frame, so a 200 us poll cannot miss it.
}

/// Acquire both pins and build a session. Fails if either pin cannot be
/// acquired or configured; the clock line starts out driven low.
pub fn open(clock_pin: u8, data_pin: u8) -> Result<Hx711<RpiClockPin, RpiDataPin>> {
    let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
    let clock = gpio
        .get(clock_pin)
        .map_err(|e| HwError::Gpio(format!("acquire clock pin {clock_pin}: {e}")))?
        .into_output_low();
    let data = gpio
        .get(data_pin)
        .map_err(|e| HwError::Gpio(format!("acquire data pin {data_pin}: {e}")))?
        .into_input();
    debug!(clock_pin, data_pin, "hx711 pins acquired");
    Ok(Hx711::new(RpiClockPin(clock), RpiDataPin(data)))
}
