//! Error types for runcal operations.

use thiserror::Error;

/// Errors that can occur while building or syncing the schedule graph.
#[derive(Error, Debug)]
pub enum RuncalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source data error: {0}")]
    Source(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for runcal operations.
pub type RuncalResult<T> = Result<T, RuncalError>;
