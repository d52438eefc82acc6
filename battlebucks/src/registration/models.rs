//! Registration data models.

use crate::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Registration document ID
pub type RegistrationId = String;

/// Payment status of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Registered, payment not yet verified by an admin
    Pending,
    /// Payment verified, holds one tournament slot
    Confirmed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Confirmed => write!(f, "Confirmed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Confirmed" => Ok(PaymentStatus::Confirmed),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

/// Registration document
///
/// `tournament_id` is a weak reference. Older documents may carry no
/// reference at all, so it is re-validated by the ledger before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub tournament_id: Option<TournamentId>,
    pub tournament_title: String,
    pub user_id: String,
    pub user_email: String,
    pub game_id: String,
    pub team_name: String,
    pub upi_id: String,
    pub payment_status: PaymentStatus,
    pub registered_at: DateTime<Utc>,
}

/// Registration form submitted by a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistration {
    pub tournament_id: TournamentId,
    pub game_id: String,
    pub team_name: String,
    pub upi_id: String,
}

/// Admin dashboard figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Sum of entry fees over confirmed registrations
    pub confirmed_revenue: i64,
    pub confirmed_count: usize,
    pub pending_count: usize,
    /// Tournaments currently being played
    pub live_tournaments: usize,
    pub recent_registrations: Vec<Registration>,
}
