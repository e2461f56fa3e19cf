//! Simulated HX711 for development without hardware.
//!
//! The chip is always conversion-ready and shifts out `base` plus bounded
//! deterministic noise, frame after frame. Pin halves are `Send`, so the
//! simulated session works under the background sampler too.

use std::sync::{Arc, Mutex, MutexGuard};

use hx711_traits::{InputPin, Level, OutputPin, PinError};

struct SimState {
    base: i32,
    noise: i32,
    seed: u64,
    /// Current frame: (value, rising edges seen).
    cursor: Option<(u32, u8)>,
    /// Frames only start shifting after a ready check has seen the data
    /// line low; reset and shutdown pulses are ignored.
    armed: bool,
    clock_high: bool,
}

impl SimState {
    fn next_sample(&mut self) -> u32 {
        self.seed = self
            .seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let jitter = if self.noise > 0 {
            ((self.seed >> 33) as i32).rem_euclid(2 * self.noise + 1) - self.noise
        } else {
            0
        };
        (self.base.wrapping_add(jitter) as u32) & 0xFF_FFFF
    }

    fn on_rising_edge(&mut self) {
        if !self.armed {
            return;
        }
        match self.cursor {
            None => {
                let v = self.next_sample();
                self.cursor = Some((v, 1));
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
            self.cursor = None;
            self.armed = false;
        }
        // Always ready for the next conversion.
        self.armed = true;
        Level::Low
    }
}

fn lock(state: &Arc<Mutex<SimState>>) -> MutexGuard<'_, SimState> {
    match state.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct SimClockPin {
    state: Arc<Mutex<SimState>>,
}

impl OutputPin for SimClockPin {
    fn write(&mut self, level: Level) -> Result<(), PinError> {
        let mut st = lock(&self.state);
        let high = level == Level::High;
        if high && !st.clock_high {
            st.on_rising_edge();
        }
        st.clock_high = high;
        Ok(())
    }
}

pub struct SimDataPin {
    state: Arc<Mutex<SimState>>,
}

impl InputPin for SimDataPin {
    fn read(&mut self) -> Result<Level, PinError> {
        Ok(lock(&self.state).data_level())
    }
}

/// Pin halves for a simulated chip reading `base` with uniform jitter in
/// `-noise..=noise` raw counts.
pub fn simulated_pair(base: i32, noise: i32) -> (SimClockPin, SimDataPin) {
    let state = Arc::new(Mutex::new(SimState {
        base,
        noise: noise.max(0),
        seed: 0x4d595df4d0f33173,
        cursor: None,
        armed: false,
        clock_high: false,
    }));
    (
        SimClockPin {
            state: state.clone(),
        },
        SimDataPin { state },
    )
}
