//! Bit-banged protocol driver for the HX711 24-bit ADC.
//!
//! The chip speaks a two-wire synchronous serial protocol: the host toggles
//! the clock line and samples the data line once per bit, most significant
//! bit first. One to three extra clock pulses after the 24 data bits select
//! gain and input channel for the *next* conversion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hx711_traits::{Clock, InputPin, Level, MonotonicClock, OutputPin};
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::filter::MovingWindow;

/// Clock hold time that forces the chip into power-down / reset.
const RESET_HOLD: Duration = Duration::from_micros(70);
/// Ready-wait iterations. The chip is usually ready within 80-500 ms, so 11
/// rounds of a 100 ms level wait bound the call at roughly one second.
const READY_TRIES: usize = 11;
const READY_WAIT_TIMEOUT: Duration = Duration::from_millis(100);

/// One HX711 session: exclusive owner of the clock (output) and data (input)
/// lines plus the calibration scalars applied to adjusted readings.
///
/// The raw-read path is a stateful multi-step serial exchange and must not be
/// used from two threads at once; [`crate::sampler::BackgroundSampler`] is
/// the one sanctioned concurrent user and takes the session by value.
pub struct Hx711<CLK, DT, C = MonotonicClock> {
    pub(crate) clock_pin: CLK,
    pub(crate) data_pin: DT,
    pub(crate) end_pulses: u8,
    pub(crate) clock: C,
    pub(crate) zero_offset: i32,
    pub(crate) scale_factor: f64,
}

/// Sign-extend a 24-bit two's-complement value into an i32.
///
/// Values below 2^23 are returned unchanged; values with bit 23 set come
/// back as `v - 2^24`.
#[inline]
pub fn sign_extend_24(v: u32) -> i32 {
    if v & 0x80_0000 != 0 {
        (v | 0xFF00_0000) as i32
    } else {
        v as i32
    }
}

#[inline(always)]
fn spin_delay() {
    // Keep clock edges from collapsing on very fast hosts.
    std::hint::spin_loop();
}

impl<CLK: OutputPin, DT: InputPin> Hx711<CLK, DT> {
    /// Create a session over already-acquired pins. The clock pin must have
    /// been configured as an output and the data pin as an input; directions
    /// never change afterwards.
    ///
    /// Defaults: gain 128 (one end pulse), zero offset 0, scale factor 1.0.
    pub fn new(clock_pin: CLK, data_pin: DT) -> Self {
        Self::with_clock(clock_pin, data_pin, MonotonicClock::new())
    }
}

impl<CLK: OutputPin, DT: InputPin, C: Clock> Hx711<CLK, DT, C> {
    /// Like [`Hx711::new`] but with an explicit clock, so tests can make the
    /// reset hold and calibration waits return instantly.
    pub fn with_clock(clock_pin: CLK, data_pin: DT, clock: C) -> Self {
        Self {
            clock_pin,
            data_pin,
            end_pulses: 1,
            clock,
            zero_offset: 0,
            scale_factor: 1.0,
        }
    }

    /// Release the pin handles back to the caller. The chip is left in
    /// whatever electrical state the last operation produced; call
    /// [`Hx711::shutdown`] first to power it down.
    pub fn into_pins(self) -> (CLK, DT) {
        (self.clock_pin, self.data_pin)
    }

    /// Select gain: 128 or 64 read input channel A, 32 reads channel B.
    /// Unrecognized values fall back to 128. Per the datasheet the change
    /// takes effect one reading after the configuring pulses.
    pub fn set_gain(&mut self, gain: u32) {
        self.end_pulses = match gain {
            128 => 1,
            64 => 3,
            32 => 2,
            _ => 1,
        };
    }

    /// Set the calibration scalars obtained from
    /// [`Hx711::get_adjust_values`](crate::calibrate).
    pub fn set_adjust(&mut self, zero_offset: i32, scale_factor: f64) -> Result<()> {
        if scale_factor == 0.0 || !scale_factor.is_finite() {
            return Err(Error::InvalidInput("scale factor must be finite and non-zero"));
        }
        self.zero_offset = zero_offset;
        self.scale_factor = scale_factor;
        Ok(())
    }

    pub fn zero_offset(&self) -> i32 {
        self.zero_offset
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Convert a raw sample to physical units.
    #[inline]
    pub fn adjust(&self, raw: i32) -> f64 {
        (f64::from(raw) - f64::from(self.zero_offset)) / self.scale_factor
    }

    fn write_clock(&mut self, level: Level) -> Result<()> {
        self.clock_pin.write(level).map_err(Error::Gpio)
    }

    fn clock_high_then_low(&mut self) -> Result<()> {
        self.write_clock(Level::High)?;
        spin_delay();
        self.write_clock(Level::Low)?;
        spin_delay();
        Ok(())
    }

    /// Start up or reset the chip: clock low, then high for at least 70 us,
    /// then low again. Required before reading if the chip may have been
    /// idle or powered down.
    pub fn reset(&mut self) -> Result<()> {
        self.write_clock(Level::Low)?;
        self.write_clock(Level::High)?;
        self.clock.sleep(RESET_HOLD);
        self.write_clock(Level::Low)
    }

    /// Power the chip down by holding the clock high. Idempotent; skipping
    /// it after a session risks drift per the datasheet.
    pub fn shutdown(&mut self) -> Result<()> {
        self.write_clock(Level::High)
    }

    /// Wait for the chip to pull the data line low, which signals that a
    /// conversion is ready to be clocked out.
    fn wait_for_data_ready(&mut self) -> Result<()> {
        self.write_clock(Level::Low)?;

        for _ in 0..READY_TRIES {
            if self.data_pin.read().map_err(Error::Gpio)? == Level::Low {
                return Ok(());
            }
            self.data_pin
                .wait_for_level(Level::Low, READY_WAIT_TIMEOUT)
                .map_err(Error::Gpio)?;
        }

        Err(Error::Timeout)
    }

    /// Clock one raw 24-bit sample out of the chip.
    ///
    /// Call [`Hx711::reset`] before a series of raw reads and
    /// [`Hx711::shutdown`] after; the `read_median*` operations do both for
    /// you. Any GPIO failure aborts immediately with the underlying cause.
    pub fn read_raw(&mut self) -> Result<i32> {
        self.wait_for_data_ready()?;

        let mut data: u32 = 0;
        for _ in 0..24 {
            self.clock_high_then_low()?;
            data <<= 1;
            if self.data_pin.read().map_err(Error::Gpio)? == Level::High {
                data |= 1;
            }
        }

        // Extra pulses select gain/channel for the next conversion.
        for _ in 0..self.end_pulses {
            self.clock_high_then_low()?;
        }

        let value = sign_extend_24(data);
        trace!(raw = value, "hx711 raw read");
        Ok(value)
    }

    /// Median of up to `num_readings` raw reads, checking `stop` before each
    /// one. Errored reads and the chip's `-1` glitch artifact are discarded
    /// without retrying to quota.
    pub(crate) fn median_raw(&mut self, num_readings: usize, stop: &AtomicBool) -> Result<i32> {
        let mut samples = Vec::with_capacity(num_readings);
        let mut last_err = None;

        for _ in 0..num_readings {
            if stop.load(Ordering::Relaxed) {
                return Err(Error::Stopped);
            }
            match self.read_raw() {
                // A reading of exactly -1 is a known chip artifact, not data.
                Ok(-1) => continue,
                Ok(v) => samples.push(v),
                Err(e) => last_err = Some(e),
            }
        }

        if samples.is_empty() {
            let last = last_err.map_or_else(|| "all readings discarded".to_owned(), |e| e.to_string());
            return Err(Error::NoSample(last));
        }

        samples.sort_unstable();
        // Lower median when the surviving count is even.
        Ok(samples[(samples.len() - 1) / 2])
    }

    /// Median of `num_readings` raw reads, bracketed by reset and shutdown.
    /// Do not call `reset` before or `shutdown` after; both are done here.
    pub fn read_median_raw(&mut self, num_readings: usize) -> Result<i32> {
        if num_readings == 0 {
            return Err(Error::InvalidInput("num_readings must be at least 1"));
        }

        self.reset()?;
        let never_stop = AtomicBool::new(false);
        let median = self.median_raw(num_readings, &never_stop);
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "hx711 shutdown after median read failed");
        }
        median
    }

    /// Median of `num_readings` raw reads, adjusted by the zero offset and
    /// scale factor. Reset and shutdown are done for you.
    pub fn read_median(&mut self, num_readings: usize) -> Result<f64> {
        let raw = self.read_median_raw(num_readings)?;
        Ok(self.adjust(raw))
    }

    /// Mean of `num_avgs` adjusted medians. A failure on any individual
    /// median aborts the whole operation; no partial averaging.
    pub fn read_median_then_avg(&mut self, num_readings: usize, num_avgs: usize) -> Result<f64> {
        if num_avgs == 0 {
            return Err(Error::InvalidInput("num_avgs must be at least 1"));
        }

        let mut sum = 0.0;
        for _ in 0..num_avgs {
            sum += self.read_median(num_readings)?;
        }
        Ok(sum / num_avgs as f64)
    }

    /// One adjusted median pushed into the caller-owned window; returns the
    /// window mean. Threading the window through explicitly lets this be
    /// called repeatedly without the driver retaining any filter state.
    pub fn read_median_then_moving_avg(
        &mut self,
        num_readings: usize,
        window: &mut MovingWindow,
    ) -> Result<f64> {
        let reading = self.read_median(num_readings)?;
        window.push(reading);
        Ok(window.mean())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{FakeChip, NullClock};
    use rstest::rstest;

    #[test]
    fn sign_extension_reference_values() {
        assert_eq!(sign_extend_24(0x000001), 1);
        assert_eq!(sign_extend_24(0x7F_FFFF), 8_388_607);
        assert_eq!(sign_extend_24(0x80_0000), -8_388_608);
        assert_eq!(sign_extend_24(0xFF_FFFF), -1);
        assert_eq!(sign_extend_24(0), 0);
    }

    #[rstest]
    #[case(128, 1)]
    #[case(64, 3)]
    #[case(32, 2)]
    #[case(999, 1)] // unrecognized gain falls back to 128 behavior
    #[case(0, 1)]
    fn gain_maps_to_end_pulses(#[case] gain: u32, #[case] pulses: u8) {
        let chip = FakeChip::new();
        let (clk, dt) = chip.pins();
        let mut hx = Hx711::with_clock(clk, dt, NullClock);
        hx.set_gain(gain);
        assert_eq!(hx.end_pulses, pulses);
    }

    #[test]
    fn adjust_applies_zero_then_scale() {
        let chip = FakeChip::new();
        let (clk, dt) = chip.pins();
        let mut hx = Hx711::with_clock(clk, dt, NullClock);
        hx.set_adjust(100, 2.0).unwrap();
        assert_eq!(hx.adjust(104), 2.0);
    }

    #[test]
    fn zero_scale_factor_is_rejected() {
        let chip = FakeChip::new();
        let (clk, dt) = chip.pins();
        let mut hx = Hx711::with_clock(clk, dt, NullClock);
        assert!(matches!(hx.set_adjust(0, 0.0), Err(Error::InvalidInput(_))));
        assert!(matches!(
            hx.set_adjust(0, f64::NAN),
            Err(Error::InvalidInput(_))
        ));
        // Failed set leaves the previous (default) factor untouched.
        assert_eq!(hx.scale_factor(), 1.0);
    }
}
