// Groupby benchmark over a CSV dataset, driven through DataFusion

pub mod config;
pub mod error;
pub mod query;
pub mod runner;
pub mod sampler;
pub mod schema;
pub mod session;

pub use config::BenchConfig;
pub use error::{Error, Result};
pub use runner::ExperimentRunner;
pub use sampler::{MemoryProbe, MemorySampler, ProcessMemoryProbe};
