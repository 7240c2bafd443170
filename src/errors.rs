use thiserror::Error;

use crate::csv::CsvError;
use crate::ledger::contribution::FieldErrors;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error(transparent)]
    Invalid(#[from] FieldErrors),
}
