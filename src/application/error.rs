use thiserror::Error;

use crate::domain::LedgerError;
use crate::io::SourceError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    MalformedInput(#[from] LedgerError),

    #[error("Invalid source: {0}")]
    InvalidSource(#[from] SourceError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Source error: {0}")]
    Source(#[from] anyhow::Error),
}

impl AppError {
    /// True when the sheet itself is unusable, as opposed to the source
    /// being unreachable.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, AppError::MalformedInput(_))
    }
}
