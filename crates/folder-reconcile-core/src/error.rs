use crate::model::Side;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0} folder is not selected")]
    RootNotSet(Side),

    #[error("Invalid folder '{}': {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Preserve folder '{}' and cleanup folder '{}' overlap", preserve.display(), cleanup.display())]
    OverlappingRoots { preserve: PathBuf, cleanup: PathBuf },

    #[error("Error scanning '{}': {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Hash backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("No reconciliation plan is prepared")]
    NoPlan,

    #[error("Operation cancelled")]
    Cancelled,
}

/// A file whose content digest could not be computed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error hashing '{}': {cause}", path.display())]
pub struct HashFailure {
    pub path: PathBuf,
    pub cause: String,
}

impl HashFailure {
    pub fn new(path: impl Into<PathBuf>, cause: impl ToString) -> Self {
        Self {
            path: path.into(),
            cause: cause.to_string(),
        }
    }
}

/// A single delete or move that did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error processing '{}': {cause}", path.display())]
pub struct ExecutionFailure {
    pub path: PathBuf,
    pub cause: String,
}
