use std::path::PathBuf;
use thiserror::Error;

/// Run-level failures. Per-record validation problems are data and never end up here.
#[derive(Debug, Error)]
pub enum TriageError {
    /// Input table does not exist; the run aborts before any output is written.
    #[error("Missing input file: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Could not read input: {0}")]
    Input(String),

    #[error("Invalid keyword table: {0}")]
    Keywords(String),

    #[error("Could not write report: {0}")]
    Report(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;
