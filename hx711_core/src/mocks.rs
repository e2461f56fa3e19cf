//! Test and helper mocks for hx711_core.
//!
//! `FakeChip` models the HX711 shift register at the bit level: the data
//! line stays high until a queued sample is available, goes low when a
//! ready check observes one, then shifts the 24-bit frame out MSB-first on
//! rising clock edges. Pulses past bit 24 are counted as gain-select pulses
//! and logged when the next ready check closes the frame.
//!
//! Pin halves are `Send` (shared `Arc<Mutex>` state) so the chip can sit on
//! the far side of a background sampler thread.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hx711_traits::{Clock, InputPin, Level, OutputPin, PinError};

#[derive(Default)]
struct ChipState {
    samples: VecDeque<u32>,
    /// Current frame: (value, rising edges seen). Edges 1..=24 clock data
    /// bits; anything beyond is a gain pulse.
    cursor: Option<(u32, u8)>,
    /// Set once a ready check has observed the data line low; clock edges
    /// before that (reset/shutdown pulses) do not shift data.
    armed: bool,
    clock_level_high: bool,
    end_pulse_log: Vec<u8>,
    read_count: usize,
    fail_read_at: Option<usize>,
    fail_all_reads: bool,
    fail_writes: usize,
}

impl ChipState {
    fn on_rising_edge(&mut self) {
        if !self.armed {
            return;
        }
        match self.cursor {
            None => {
                if let Some(v) = self.samples.pop_front() {
                    self.cursor = Some((v, 1));
                }
            }
            Some((v, n)) => self.cursor = Some((v, n.saturating_add(1))),
        }
    }

    fn data_level(&mut self) -> Level {
        if let Some((v, n)) = self.cursor {
            if (1..=24).contains(&n) {
                return if (v >> (24 - u32::from(n))) & 1 == 1 {
                    Level::High
                } else {
                    Level::Low
                };
            }
            // Ready check after a completed frame: close it out.
            self.end_pulse_log.push(n - 24);
            self.cursor = None;
            self.armed = false;
        }
        if self.samples.is_empty() {
            Level::High
        } else {
            self.armed = true;
            Level::Low
        }
    }
}

/// Shared fake chip; create pin halves with [`FakeChip::pins`].
#[derive(Clone)]
pub struct FakeChip {
    state: Arc<Mutex<ChipState>>,
}

impl Default for FakeChip {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChip {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChipState::default())),
        }
    }

    pub fn pins(&self) -> (FakeClockPin, FakeDataPin) {
        (
            FakeClockPin {
                state: self.state.clone(),
            },
            FakeDataPin {
                state: self.state.clone(),
            },
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChipState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Queue one conversion result, given as the signed value the driver
    /// should come back with after sign extension.
    pub fn push_sample(&self, raw: i32) {
        self.lock().samples.push_back((raw as u32) & 0xFF_FFFF);
    }

    pub fn push_samples<I: IntoIterator<Item = i32>>(&self, raws: I) {
        let mut st = self.lock();
        for raw in raws {
            st.samples.push_back((raw as u32) & 0xFF_FFFF);
        }
    }

    pub fn queued(&self) -> usize {
        self.lock().samples.len()
    }

    /// Gain-select pulse counts recorded for each completed frame.
    pub fn end_pulse_log(&self) -> Vec<u8> {
        self.lock().end_pulse_log.clone()
    }

    /// Make the nth data-line read (1-based, counting every read attempt)
    /// fail with an injected GPIO error.
    pub fn fail_read_at(&self, nth: usize) {
        self.lock().fail_read_at = Some(nth);
    }

    /// Make every data-line read fail until switched off.
    pub fn fail_all_reads(&self, fail: bool) {
        self.lock().fail_all_reads = fail;
    }

    /// Make the next `count` clock writes fail.
    pub fn fail_writes(&self, count: usize) {
        self.lock().fail_writes = count;
    }
}

pub struct FakeClockPin {
    state: Arc<Mutex<ChipState>>,
}

pub struct FakeDataPin {
    state: Arc<Mutex<ChipState>>,
}

fn lock(state: &Arc<Mutex<ChipState>>) -> std::sync::MutexGuard<'_, ChipState> {
    match state.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl OutputPin for FakeClockPin {
    fn write(&mut self, level: Level) -> Result<(), PinError> {
        let mut st = lock(&self.state);
        if st.fail_writes > 0 {
            st.fail_writes -= 1;
            return Err("injected clock write failure".into());
        }
        let high = level == Level::High;
        if high && !st.clock_level_high {
            st.on_rising_edge();
        }
        st.clock_level_high = high;
        Ok(())
    }
}

impl InputPin for FakeDataPin {
    fn read(&mut self) -> Result<Level, PinError> {
        let mut st = lock(&self.state);
        st.read_count += 1;
        if st.fail_all_reads || st.fail_read_at == Some(st.read_count) {
            return Err("injected data read failure".into());
        }
        Ok(st.data_level())
    }

    fn wait_for_level(&mut self, level: Level, _timeout: Duration) -> Result<bool, PinError> {
        // No real time passes in tests; report the current level so the
        // driver's ready loop terminates quickly either way.
        std::thread::sleep(Duration::from_millis(1));
        let mut st = lock(&self.state);
        Ok(st.data_level() == level)
    }
}

/// Clock whose sleeps return immediately; keeps reset holds and guided
/// calibration waits out of test wall time.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullClock;

impl Clock for NullClock {
    fn sleep(&self, _d: Duration) {}
}
