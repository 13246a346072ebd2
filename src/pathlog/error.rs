use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathlogError {
    #[error("{} is already running", .0.display())]
    AlreadyRunning(PathBuf),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("storage unavailable at {location}: {reason}")]
    StorageUnavailable { location: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Scan error: {0}")]
    Scan(#[from] walkdir::Error),

    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("interrupted")]
    Interrupted,
}

impl PathlogError {
    /// Whether this error is a failure the binary reports with a single
    /// diagnostic line and exit status 1.
    ///
    /// `Usage` is rendered by clap and `Interrupted` is a clean exit.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PathlogError::Usage(_) | PathlogError::Interrupted)
    }

    pub fn storage(location: impl Into<String>, reason: impl ToString) -> Self {
        PathlogError::StorageUnavailable {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PathlogError>;
