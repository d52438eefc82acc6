//! Registration error types.

use crate::db::StoreError;
use thiserror::Error;

/// Registration errors
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Caller identity carries no email to contact the registrant at
    #[error("Caller has no email address")]
    MissingEmail,

    #[error("Tournament not found: {0}")]
    TournamentNotFound(String),

    #[error("Tournament {0} is completed")]
    TournamentClosed(String),

    #[error("Registration not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl RegistrationError {
    /// Get a client-safe error message that doesn't leak store internals
    pub fn client_message(&self) -> String {
        match self {
            RegistrationError::InvalidField { reason, .. } => reason.clone(),
            RegistrationError::TournamentNotFound(_) => "Tournament not found!".to_string(),
            RegistrationError::TournamentClosed(_) => {
                "Registration for this tournament is closed.".to_string()
            }
            RegistrationError::Store(_) => {
                "Could not save the registration, please retry".to_string()
            }
            _ => self.to_string(),
        }
    }
}

pub type RegistrationResult<T> = Result<T, RegistrationError>;
