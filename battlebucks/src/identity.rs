//! Caller identity passed explicitly into every operation.

use serde::{Deserialize, Serialize};

/// The authenticated actor behind a request.
///
/// Handlers receive this from the transport layer and hand it down; nothing
/// in the library reads session state from anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Auth provider user ID
    pub uid: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl CallerIdentity {
    /// Identity of a regular player
    pub fn player(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
            is_admin: false,
        }
    }

    /// Identity of an admin
    pub fn admin(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            is_admin: true,
        }
    }
}

impl std::fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_admin {
            write!(f, "admin:{}", self.uid)
        } else {
            write!(f, "user:{}", self.uid)
        }
    }
}
