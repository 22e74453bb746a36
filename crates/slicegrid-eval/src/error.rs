//! Report and pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

/// File-level failures that abort an evaluation run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to close report: {0}")]
    Close(#[source] std::io::Error),

    #[error("evaluation worker failed: {0}")]
    Worker(String),
}

pub type ReportResult<T> = Result<T, ReportError>;
