pub mod error;
pub mod model;
pub mod report;
pub mod store;

pub use error::{Error, Result};
pub use model::{ExperimentResult, MemorySample};
pub use report::{BarMetric, ReportRenderer};
pub use store::ResultsStore;
