//! Single error type for the public API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PosioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required input file missing: {0}")]
    MissingInput(&'static str),
}

pub type Result<T> = std::result::Result<T, PosioError>;
