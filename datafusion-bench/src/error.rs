use datafusion::error::DataFusionError;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    Results(bench_results::Error),
    DataFusion(String),
    Config(String),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Results(e) => write!(f, "Results store error: {}", e),
            Error::DataFusion(msg) => write!(f, "DataFusion error: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<bench_results::Error> for Error {
    fn from(err: bench_results::Error) -> Self {
        Error::Results(err)
    }
}

impl From<DataFusionError> for Error {
    fn from(err: DataFusionError) -> Self {
        Error::DataFusion(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
