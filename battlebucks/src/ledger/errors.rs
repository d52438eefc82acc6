//! Ledger error types.

use crate::db::StoreError;
use thiserror::Error;

/// Registration ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Tournament reference on the registration is missing or malformed.
    /// Raised before any transaction is attempted.
    #[error("Invalid tournament reference: {0}")]
    InvalidReference(String),

    /// Document missing at transaction time
    #[error("{collection} document not found: {id}")]
    NotFound { collection: &'static str, id: String },

    /// No slots left to confirm into
    #[error("No slots left in tournament {tournament_id} ({slots_total} total)")]
    CapacityExceeded {
        tournament_id: String,
        slots_total: i64,
    },

    /// The store could not commit the transaction
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),
}

impl LedgerError {
    pub(crate) fn tournament_not_found(id: &str) -> Self {
        LedgerError::NotFound {
            collection: "tournaments",
            id: id.to_string(),
        }
    }

    pub(crate) fn registration_not_found(id: &str) -> Self {
        LedgerError::NotFound {
            collection: "registrations",
            id: id.to_string(),
        }
    }

    /// Get a client-safe error message that doesn't leak store internals
    pub fn client_message(&self) -> String {
        match self {
            LedgerError::TransactionAborted(_) => {
                "Could not update the registration, please retry".to_string()
            }
            LedgerError::CapacityExceeded { .. } => "No slots left in this tournament.".to_string(),
            LedgerError::NotFound { collection, .. } if *collection == "tournaments" => {
                "Tournament not found!".to_string()
            }
            LedgerError::InvalidReference(_) => {
                "This registration has an invalid or missing tournament ID.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::TransactionAborted(e.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        LedgerError::TransactionAborted(e.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
