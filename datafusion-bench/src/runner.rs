//! Drives one experiment end to end: session, sampler, query, persistence.

use bench_results::{ExperimentResult, ResultsStore};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::BenchConfig;
use crate::error::{Error, Result};
use crate::query::{
    aggregate, format_batches, group_counts, head, load_dataset, repartition_and_cache,
    sort_by_count,
};
use crate::sampler::{MemoryProbe, MemorySampler, ProcessMemoryProbe};
use crate::session::BenchSession;

/// Rows of the dataset shown before the timed section
const PREVIEW_ROWS: usize = 10;

/// Rows of each query result shown
const RESULT_ROWS: usize = 5;

/// Progress of a single run; any failure ends in `Failed` without persisting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    SessionStarted,
    SamplerRunning,
    DataLoaded,
    Optimized,
    Aggregated,
    Sorted,
    SamplerStopped,
    ResultsPersisted,
    SessionClosed,
    Failed,
}

/// What a successful run measured and stored
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub experiment_key: String,
    pub optimize: bool,
    pub initial_rows: usize,
    /// `(group, count)` in the order returned by the sorted query
    pub sorted_counts: Vec<(Option<String>, i64)>,
    pub result: ExperimentResult,
}

pub struct ExperimentRunner<P = ProcessMemoryProbe> {
    config: BenchConfig,
    probe: P,
}

impl ExperimentRunner<ProcessMemoryProbe> {
    pub fn new(config: BenchConfig) -> Self {
        Self::with_probe(config, ProcessMemoryProbe)
    }
}

impl<P: MemoryProbe + Clone> ExperimentRunner<P> {
    pub fn with_probe(config: BenchConfig, probe: P) -> Self {
        Self { config, probe }
    }

    /// Run the query once and merge the measurements into the results file
    /// under `experiment_key`.
    ///
    /// Nothing is written if any step fails.
    pub async fn run(&self, optimize: bool, experiment_key: &str) -> Result<ExperimentReport> {
        if experiment_key.is_empty() {
            return Err(Error::Config("experiment key must not be empty".to_string()));
        }
        self.config.validate()?;

        let mut phase = RunPhase::Init;
        let outcome = self.execute(optimize, experiment_key, &mut phase).await;
        if let Err(e) = &outcome {
            error!(failed_after = ?phase, error = %e, "experiment failed");
            advance(&mut phase, RunPhase::Failed);
        }
        outcome
    }

    async fn execute(
        &self,
        optimize: bool,
        experiment_key: &str,
        phase: &mut RunPhase,
    ) -> Result<ExperimentReport> {
        let session = BenchSession::start(&self.config)?;
        println!("Engine session started. Optimizations enabled: {}", optimize);
        let started = Instant::now();
        advance(phase, RunPhase::SessionStarted);

        // Dropping the sampler on an early return disconnects and stops it
        let sampler = MemorySampler::start(self.probe.clone(), started, self.config.sample_interval)?;
        advance(phase, RunPhase::SamplerRunning);

        println!("Reading dataset from {}...", self.config.dataset_path.display());
        let ctx = session.context();
        let mut df = load_dataset(ctx, &self.config.dataset_path).await?;

        println!("root");
        for field in df.schema().fields() {
            println!(
                " |-- {}: {} (nullable = {})",
                field.name(),
                field.data_type(),
                field.is_nullable()
            );
        }
        let preview = df.clone().limit(0, Some(PREVIEW_ROWS))?.collect().await?;
        println!("{}", format_batches(&preview)?);

        let initial_rows = df.clone().count().await?;
        println!("Rows in dataset: {}", initial_rows);
        advance(phase, RunPhase::DataLoaded);

        if optimize {
            println!(
                "Applying optimizations: repartition({}) and cache",
                self.config.partitions
            );
            let (cached, _) = repartition_and_cache(df, self.config.partitions).await?;
            df = cached;
            advance(phase, RunPhase::Optimized);
        }

        let ops_started = Instant::now();

        println!("Aggregating by original_language...");
        let grouped = aggregate(df)?;
        let grouped_batches = grouped.clone().collect().await?;
        println!("Aggregation results:");
        println!("{}", format_batches(&head(&grouped_batches, RESULT_ROWS))?);
        advance(phase, RunPhase::Aggregated);

        println!("Sorting aggregated results by count descending...");
        let sorted_batches = sort_by_count(grouped)?.collect().await?;
        println!("{}", format_batches(&head(&sorted_batches, RESULT_ROWS))?);
        advance(phase, RunPhase::Sorted);

        let finished = Instant::now();
        let ops_time = finished.duration_since(ops_started).as_secs_f64();
        let total_time = finished.duration_since(started).as_secs_f64();
        println!("Operations time: {:.2} seconds", ops_time);
        println!("Total execution time: {:.2} seconds", total_time);
        let sorted_counts = group_counts(&sorted_batches)?;

        let samples = sampler.stop()?;
        advance(phase, RunPhase::SamplerStopped);

        let result = ExperimentResult::from_samples(ops_time, total_time, samples);
        println!("Final memory usage: {:.2} MB", result.final_memory_usage);

        ResultsStore::upsert_file(&self.config.results_path, experiment_key, result.clone())?;
        println!(
            "Results of experiment '{}' saved to {}",
            experiment_key,
            self.config.results_path.display()
        );
        advance(phase, RunPhase::ResultsPersisted);

        session.close();
        advance(phase, RunPhase::SessionClosed);

        info!(
            experiment_key,
            optimize,
            ops_time,
            total_time,
            samples = result.memory_usage_over_time.len(),
            "experiment complete"
        );

        Ok(ExperimentReport {
            experiment_key: experiment_key.to_string(),
            optimize,
            initial_rows,
            sorted_counts,
            result,
        })
    }
}

fn advance(phase: &mut RunPhase, next: RunPhase) {
    debug!(from = ?*phase, to = ?next, "run phase");
    *phase = next;
}
