//! Error types for the persistence and feedback bridges
//!
//! None of these ever reach the simulation: callers fall back to defaults.

use thiserror::Error;

/// Key-value store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// No store is available on this platform (e.g. storage disabled)
    #[error("storage is unavailable")]
    Unavailable,
    /// The store rejected a read or write
    #[error("storage access failed: {0}")]
    Access(String),
}

/// Reasons a saved progression record could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no saved progress found")]
    Missing,
    #[error("saved progress is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reasons a progression record could not be written
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to encode progress: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Motivational phrase supplier failures
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("phrase request failed: {0}")]
    Request(String),
    #[error("phrase request timed out")]
    Timeout,
    #[error("phrase supplier returned an empty phrase")]
    Empty,
}
