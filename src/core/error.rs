use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::services::StoreError;

/// Errors surfaced by the discovery and swipe engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Storage unavailable or the operation deadline expired; safe to retry
    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Daily decision cap reached; lifts on the next calendar day
    #[error("Daily swipe limit of {limit} reached")]
    QuotaExceeded { limit: i64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl EngineError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Transient(_))
    }
}

impl From<StoreError> for EngineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unavailable(message) => EngineError::Transient(message),
            StoreError::ForeignKey(message) => EngineError::NotFound(message),
            other => EngineError::Storage(other),
        }
    }
}

impl From<tokio::time::error::Elapsed> for EngineError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        EngineError::Transient("operation deadline exceeded".to_string())
    }
}

/// Bound an engine operation by `deadline`; expiry is a transient failure
pub(crate) async fn with_deadline<T, F>(deadline: Duration, operation: F) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, EngineError>>,
{
    tokio::time::timeout(deadline, operation).await?
}
