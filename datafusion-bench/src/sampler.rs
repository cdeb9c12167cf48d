//! Background sampling of process resident memory
//!
//! The sampler runs on its own thread so that engine work saturating the
//! async runtime cannot delay it. Sampling stops when [`MemorySampler::stop`]
//! signals the thread, which wakes immediately instead of finishing its sleep.

use bench_results::MemorySample;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{Error, Result};

/// Source of the current resident memory figure
pub trait MemoryProbe: Send + 'static {
    /// Resident memory in MB, or `None` if it could not be read
    fn resident_mb(&self) -> Option<f64>;
}

/// Reads the resident set size of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessMemoryProbe;

impl MemoryProbe for ProcessMemoryProbe {
    fn resident_mb(&self) -> Option<f64> {
        memory_stats::memory_stats().map(|usage| usage.physical_mem as f64 / (1024.0 * 1024.0))
    }
}

/// Handle to a running sampler thread
pub struct MemorySampler {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<Vec<MemorySample>>,
}

impl MemorySampler {
    /// Start sampling every `interval`, with elapsed times measured from `started`.
    ///
    /// The first sample is taken immediately.
    pub fn start<P: MemoryProbe>(probe: P, started: Instant, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("memory-sampler".to_string())
            .spawn(move || sample_loop(probe, started, interval, stop_rx))
            .map_err(|e| Error::Internal(format!("Failed to spawn memory sampler: {}", e)))?;

        Ok(Self { stop_tx, handle })
    }

    /// Signal the sampler and wait for it to finish, returning every sample taken
    pub fn stop(self) -> Result<Vec<MemorySample>> {
        // A send error only means the thread has already exited
        let _ = self.stop_tx.send(());
        self.handle
            .join()
            .map_err(|_| Error::Internal("memory sampler thread panicked".to_string()))
    }
}

fn sample_loop<P: MemoryProbe>(
    probe: P,
    started: Instant,
    interval: Duration,
    stop_rx: mpsc::Receiver<()>,
) -> Vec<MemorySample> {
    let mut samples = Vec::new();
    let mut next_tick = Instant::now();

    loop {
        let elapsed = started.elapsed().as_secs_f64();
        match probe.resident_mb() {
            Some(memory_mb) => samples.push(MemorySample::new(elapsed, memory_mb)),
            None => debug!(elapsed, "resident memory unavailable, skipping sample"),
        }

        // Fixed schedule so slow probes do not accumulate drift
        next_tick += interval;
        let wait = next_tick.saturating_duration_since(Instant::now());
        match stop_rx.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!(samples = samples.len(), "memory sampler stopped");
    samples
}
