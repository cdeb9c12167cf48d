//! Runner configuration
//!
//! Defaults are fixed constants; each one can be overridden through an
//! environment variable and then again by command-line flags.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Dataset location on the shared (network-mounted) filesystem
pub const DEFAULT_DATASET_PATH: &str = "/mnt/hadoop/user/hadoop/test_data.csv";

pub const DEFAULT_RESULTS_PATH: &str = "/opt/bench-app/results.json";

/// Partition count used by the optimized run
pub const DEFAULT_PARTITIONS: usize = 4;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

pub const DEFAULT_MEMORY_LIMIT_MB: usize = 1024;

pub const ENV_DATASET_PATH: &str = "BENCH_DATASET_PATH";
pub const ENV_RESULTS_PATH: &str = "BENCH_RESULTS_PATH";
pub const ENV_SAMPLE_INTERVAL_MS: &str = "BENCH_SAMPLE_INTERVAL_MS";
pub const ENV_PARTITIONS: &str = "BENCH_PARTITIONS";
pub const ENV_MEMORY_LIMIT_MB: &str = "BENCH_MEMORY_LIMIT_MB";
pub const ENV_TARGET_PARTITIONS: &str = "BENCH_TARGET_PARTITIONS";

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub dataset_path: PathBuf,
    pub results_path: PathBuf,
    /// Round-robin partitions applied before caching in optimized runs
    pub partitions: usize,
    pub sample_interval: Duration,
    /// Upper bound for the engine's memory pool
    pub memory_limit_mb: usize,
    /// Engine parallelism; `None` keeps DataFusion's default (CPU count)
    pub target_partitions: Option<usize>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            partitions: DEFAULT_PARTITIONS,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
            target_partitions: None,
        }
    }
}

impl BenchConfig {
    /// Defaults overridden by `BENCH_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATASET_PATH) {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_RESULTS_PATH) {
            config.results_path = PathBuf::from(path);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_SAMPLE_INTERVAL_MS)? {
            config.sample_interval = Duration::from_millis(ms);
        }
        if let Some(partitions) = parse_var(&lookup, ENV_PARTITIONS)? {
            config.partitions = partitions;
        }
        if let Some(limit) = parse_var(&lookup, ENV_MEMORY_LIMIT_MB)? {
            config.memory_limit_mb = limit;
        }
        if let Some(target) = parse_var(&lookup, ENV_TARGET_PARTITIONS)? {
            config.target_partitions = Some(target);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(Error::Config("partitions must be at least 1".to_string()));
        }
        if self.sample_interval.is_zero() {
            return Err(Error::Config("sample interval must be positive".to_string()));
        }
        if self.memory_limit_mb == 0 {
            return Err(Error::Config("memory limit must be positive".to_string()));
        }
        if self.target_partitions == Some(0) {
            return Err(Error::Config("target partitions must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid {}={:?}: {}", name, raw, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BenchConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, BenchConfig::default());
        assert_eq!(config.partitions, 4);
        assert_eq!(config.sample_interval, Duration::from_millis(500));
        assert_eq!(config.memory_limit_mb, 1024);
    }

    #[test]
    fn test_env_overrides() {
        let config = BenchConfig::from_lookup(lookup_from(&[
            (ENV_DATASET_PATH, "/data/movies.csv"),
            (ENV_RESULTS_PATH, "/tmp/results.json"),
            (ENV_SAMPLE_INTERVAL_MS, "100"),
            (ENV_PARTITIONS, "8"),
            (ENV_TARGET_PARTITIONS, "2"),
        ]))
        .unwrap();

        assert_eq!(config.dataset_path, PathBuf::from("/data/movies.csv"));
        assert_eq!(config.results_path, PathBuf::from("/tmp/results.json"));
        assert_eq!(config.sample_interval, Duration::from_millis(100));
        assert_eq!(config.partitions, 8);
        assert_eq!(config.target_partitions, Some(2));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = BenchConfig::from_lookup(lookup_from(&[(ENV_PARTITIONS, "four")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = BenchConfig::from_lookup(lookup_from(&[(ENV_SAMPLE_INTERVAL_MS, "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
