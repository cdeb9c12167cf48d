//! Run the groupby benchmark once and record it in the results file
//!
//! Usage:
//!   run-experiment --experiment-key node1_plain
//!   run-experiment --optimize --experiment-key node1_opt
//!
//! Dataset and results locations default to fixed paths and can be changed
//! with BENCH_DATASET_PATH / BENCH_RESULTS_PATH or the flags below.

use clap::Parser;
use datafusion_bench::{BenchConfig, ExperimentRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "run-experiment", about = "Groupby benchmark experiment runner")]
struct Args {
    /// Repartition and cache the dataset before the timed operations.
    #[arg(long, default_value_t = false)]
    optimize: bool,

    /// Key the results are stored under, e.g. `<datanode>_<plain|opt>`.
    #[arg(long, value_parser = non_empty)]
    experiment_key: String,

    /// Override the dataset CSV location.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Override the results JSON location.
    #[arg(long)]
    results: Option<PathBuf>,

    /// Memory sampling interval in milliseconds.
    #[arg(long)]
    sample_interval_ms: Option<u64>,
}

fn non_empty(value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

fn build_config(args: &Args) -> datafusion_bench::Result<BenchConfig> {
    let mut config = BenchConfig::from_env()?;
    if let Some(dataset) = &args.dataset {
        config.dataset_path = dataset.clone();
    }
    if let Some(results) = &args.results {
        config.results_path = results.clone();
    }
    if let Some(ms) = args.sample_interval_ms {
        config.sample_interval = Duration::from_millis(ms);
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let outcome = match build_config(&args) {
        Ok(config) => {
            ExperimentRunner::new(config)
                .run(args.optimize, &args.experiment_key)
                .await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Experiment failed:");
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}
