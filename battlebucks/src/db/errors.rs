//! Store error types.

use std::time::Duration;
use thiserror::Error;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Operation did not finish in time
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// A stored value could not be decoded
    #[error("Corrupt {collection} document {id}: {reason}")]
    Corrupt {
        collection: &'static str,
        id: String,
        reason: String,
    },

    /// Document with the same ID already exists
    #[error("Duplicate {collection} document: {id}")]
    Duplicate { collection: &'static str, id: String },

    /// Store cannot serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
