//! Notification error types.

use thiserror::Error;

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The receiving worker has shut down
    #[error("Notification channel closed")]
    Closed,

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;
