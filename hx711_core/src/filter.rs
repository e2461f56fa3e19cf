//! Fixed-capacity moving-average window over calibrated readings.

use std::collections::VecDeque;

/// Bounded queue of the most recent readings. Appending at capacity drops
/// the oldest value, so the length never exceeds the configured capacity.
#[derive(Debug, Clone)]
pub struct MovingWindow {
    buf: VecDeque<f64>,
    capacity: usize,
}

impl MovingWindow {
    /// A window holding at most `capacity` readings (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, reading: f64) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(reading);
    }

    /// Arithmetic mean of the current contents; 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.buf.is_empty() {
            return 0.0;
        }
        self.buf.iter().sum::<f64>() / self.buf.len() as f64
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.buf.iter().copied()
    }
}
