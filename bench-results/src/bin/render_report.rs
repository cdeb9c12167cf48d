//! Render benchmark charts from one or more results files
//!
//! Usage:
//!   render-report [--output-dir output] [results_1.json results_3.json ...]

use bench_results::report::{DEFAULT_INPUT_FILES, DEFAULT_OUTPUT_DIR};
use bench_results::{ReportRenderer, ResultsStore};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "render-report", about = "Render charts from experiment results")]
struct Args {
    /// Results files to merge, later files win on duplicate keys.
    /// Defaults to results_1.json and results_3.json.
    inputs: Vec<PathBuf>,

    /// Directory the PNG charts are written to.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let inputs = if args.inputs.is_empty() {
        DEFAULT_INPUT_FILES.iter().map(PathBuf::from).collect()
    } else {
        args.inputs
    };

    let store = ResultsStore::load_merged(&inputs)?;
    info!(experiments = ?store.keys(), "loaded results");

    let renderer = ReportRenderer::new(args.output_dir);
    let written = renderer.render(&store)?;
    info!("rendered {} charts into {}", written.len(), renderer.output_dir().display());

    Ok(())
}
