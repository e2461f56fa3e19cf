//! Background continuous sampling.
//!
//! Spawns a thread that takes sole ownership of the HX711 session, keeps a
//! private moving-average window, and publishes only the derived mean
//! through a lock-free slot. Stop is cooperative: the flag is checked
//! between individual raw reads, so stop latency is bounded by one raw
//! read rather than a whole median.
//!
//! Safety: each `BackgroundSampler` spawns exactly one thread that is
//! automatically shut down when the sampler is dropped, preventing thread
//! leaks.

use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use hx711_traits::{Clock, InputPin, OutputPin};
use tracing::{debug, warn};

use crate::driver::Hx711;
use crate::error::Error;
use crate::filter::MovingWindow;

/// Backoff between reset attempts at sampler startup.
const RESET_RETRY_BACKOFF: Duration = Duration::from_secs(1);

pub struct BackgroundSampler {
    avg_bits: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    done: xch::Receiver<()>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl BackgroundSampler {
    /// Move `hx711` onto a dedicated thread that continuously updates a
    /// moving average of `window_capacity` adjusted medians, each over
    /// `num_readings` raw reads.
    ///
    /// A failing reset only delays startup: it is retried forever with a
    /// one second backoff. Transient sampling errors are logged and the
    /// last good mean persists until the next successful median.
    pub fn spawn<CLK, DT, C>(
        mut hx711: Hx711<CLK, DT, C>,
        num_readings: usize,
        window_capacity: usize,
    ) -> Self
    where
        CLK: OutputPin + Send + 'static,
        DT: InputPin + Send + 'static,
        C: Clock + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let avg_bits = Arc::new(AtomicU64::new(0.0_f64.to_bits()));
        let avg_slot = avg_bits.clone();
        let (done_tx, done) = xch::bounded(1);

        let join_handle = std::thread::spawn(move || {
            let num_readings = num_readings.max(1);

            while !stop_flag.load(Ordering::Relaxed) {
                match hx711.reset() {
                    Ok(()) => break,
                    Err(e) => {
                        warn!(error = %e, "background sampler reset failed, retrying");
                        hx711.clock.sleep(RESET_RETRY_BACKOFF);
                    }
                }
            }

            let mut window = MovingWindow::new(window_capacity);
            while !stop_flag.load(Ordering::Relaxed) {
                match hx711.median_raw(num_readings, &stop_flag) {
                    Ok(raw) => {
                        window.push(hx711.adjust(raw));
                        avg_slot.store(window.mean().to_bits(), Ordering::Relaxed);
                    }
                    Err(Error::Stopped) => break,
                    // Leave the last good mean in place on transient errors.
                    Err(e) => warn!(error = %e, "background sampler median failed, retrying"),
                }
            }

            if let Err(e) = hx711.shutdown() {
                warn!(error = %e, "background sampler shutdown failed");
            }
            debug!("background sampler stopped");
            // One-shot completion signal; the receiver also observes the
            // sender dropping when this thread exits.
            let _ = done_tx.send(());
        });

        Self {
            avg_bits,
            stop,
            done,
            join_handle: Some(join_handle),
        }
    }

    /// Most recently published moving average; 0.0 until the first
    /// successful median.
    pub fn latest(&self) -> f64 {
        f64::from_bits(self.avg_bits.load(Ordering::Relaxed))
    }

    /// Request a cooperative stop. Observed between raw reads, so the
    /// sampler winds down within roughly one raw-read duration.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Wait up to `timeout` for the completion signal. Returns `true` once
    /// the sampling thread has shut the chip down and exited its loop;
    /// idempotent across callers.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.done.recv_timeout(timeout) {
            Ok(()) => true,
            // Sender dropped after signaling: the thread is gone either way.
            Err(xch::RecvTimeoutError::Disconnected) => true,
            Err(xch::RecvTimeoutError::Timeout) => false,
        }
    }

    /// Convenience: `stop` then `wait`.
    pub fn stop_and_wait(&self, timeout: Duration) -> bool {
        self.stop();
        self.wait(timeout)
    }
}

impl Drop for BackgroundSampler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => debug!("background sampler thread joined"),
                Err(e) => warn!(?e, "background sampler thread panicked during shutdown"),
            }
        }
    }
}
