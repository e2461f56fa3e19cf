//! Guided two-point calibration.
//!
//! The waits here are for the operator to load and unload the scale; this
//! is the one place where sleeping for human reaction time is intended.

use std::io::Write;
use std::time::Duration;

use hx711_traits::{Clock, InputPin, OutputPin};

use crate::driver::Hx711;
use crate::error::{Error, Result};

const EMPTY_SCALE_WAIT: Duration = Duration::from_secs(5);
const WEIGHT_WAIT: Duration = Duration::from_secs(15);
const CALIBRATION_READINGS: usize = 11;

/// Recommended calibration values derived from three median readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustValues {
    /// Raw median with the scale empty.
    pub zero_offset: i32,
    /// Scale-factor estimates from the two reference weights; the order of
    /// the pair is not meaningful.
    pub scale_bounds: (f64, f64),
}

impl AdjustValues {
    pub fn scale_min(&self) -> f64 {
        self.scale_bounds.0.min(self.scale_bounds.1)
    }

    pub fn scale_max(&self) -> f64 {
        self.scale_bounds.0.max(self.scale_bounds.1)
    }
}

impl<CLK: OutputPin, DT: InputPin, C: Clock> Hx711<CLK, DT, C> {
    /// Walk the operator through an empty reading and two known weights,
    /// writing prompts to `out`, and return the recommended zero offset and
    /// scale-factor bounds. Any median failure aborts the whole routine;
    /// no partial result is produced.
    ///
    /// Do not call `reset` before or `shutdown` after; each median read
    /// does both.
    pub fn get_adjust_values(
        &mut self,
        weight1: f64,
        weight2: f64,
        out: &mut impl Write,
    ) -> Result<AdjustValues> {
        if !(weight1.is_finite() && weight1 > 0.0) {
            return Err(Error::InvalidInput("weight1 must be a positive number"));
        }
        if !(weight2.is_finite() && weight2 > 0.0) {
            return Err(Error::InvalidInput("weight2 must be a positive number"));
        }

        writeln!(
            out,
            "Make sure scale is working and empty, getting weight in 5 seconds..."
        )?;
        self.clock.sleep(EMPTY_SCALE_WAIT);
        writeln!(out, "Getting weight...")?;
        let zero = self.read_median_raw(CALIBRATION_READINGS)?;
        writeln!(out, "Raw weight is: {zero}\n")?;

        let s1 = self.timed_reference_read(weight1, 1, out)?;
        let s2 = self.timed_reference_read(weight2, 2, out)?;

        Ok(AdjustValues {
            zero_offset: zero,
            scale_bounds: (
                (f64::from(s1) - f64::from(zero)) / weight1,
                (f64::from(s2) - f64::from(zero)) / weight2,
            ),
        })
    }

    fn timed_reference_read(
        &mut self,
        weight: f64,
        ordinal: u8,
        out: &mut impl Write,
    ) -> Result<i32> {
        let which = if ordinal == 1 { "first" } else { "second" };
        writeln!(
            out,
            "Put {which} weight of {weight:.2} on scale, getting weight in 15 seconds..."
        )?;
        self.clock.sleep(WEIGHT_WAIT);
        writeln!(out, "Getting weight...")?;
        let raw = self.read_median_raw(CALIBRATION_READINGS)?;
        writeln!(out, "Raw weight is: {raw}\n")?;
        Ok(raw)
    }
}
