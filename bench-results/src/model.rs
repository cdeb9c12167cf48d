use serde::{Deserialize, Serialize};

/// One resident-memory observation: seconds since experiment start and RSS in MB.
///
/// Serialized as a two-element array `[elapsed, memory_mb]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemorySample(pub f64, pub f64);

impl MemorySample {
    pub fn new(elapsed_secs: f64, memory_mb: f64) -> Self {
        Self(elapsed_secs, memory_mb)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.0
    }

    pub fn memory_mb(&self) -> f64 {
        self.1
    }
}

/// Measurements recorded for a single experiment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Aggregation + sort only, in seconds
    pub ops_time: f64,
    /// Session start through the end of the sort, in seconds
    pub total_time: f64,
    /// Last sampled resident memory, in MB
    pub final_memory_usage: f64,
    pub memory_usage_over_time: Vec<MemorySample>,
}

impl ExperimentResult {
    /// Build a result from timings and a sampled memory series.
    ///
    /// `final_memory_usage` is taken from the last sample, or 0.0 when the
    /// series is empty.
    pub fn from_samples(ops_time: f64, total_time: f64, samples: Vec<MemorySample>) -> Self {
        let final_memory_usage = samples.last().map(|s| s.memory_mb()).unwrap_or(0.0);
        Self {
            ops_time,
            total_time,
            final_memory_usage,
            memory_usage_over_time: samples,
        }
    }
}
