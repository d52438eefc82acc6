//! Ledger operation models and the slot accounting rule.

use super::errors::{LedgerError, LedgerResult};
use crate::registration::{PaymentStatus, RegistrationId};
use crate::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default number of attempts a store makes before giving up on a
/// conflicting slot transaction
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Longest tournament reference accepted
pub const MAX_REFERENCE_LEN: usize = 1500;

/// How `RevertToPending` treats the slot counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertMode {
    /// Always decrement. The counter can drop below the confirmed count, or
    /// below zero, when the registration was not confirmed.
    Unconditional,
    /// Decrement only when the registration is confirmed and the counter is
    /// above zero
    #[default]
    Guarded,
}

impl FromStr for RevertMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unconditional" => Ok(RevertMode::Unconditional),
            "guarded" => Ok(RevertMode::Guarded),
            other => Err(format!("unknown revert mode '{other}'")),
        }
    }
}

/// A slot transaction to run against a (registration, tournament) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOp {
    /// Mark the registration confirmed, consuming one slot
    Confirm,
    /// Mark the registration pending, releasing one slot
    RevertToPending(RevertMode),
}

impl SlotOp {
    pub fn name(&self) -> &'static str {
        match self {
            SlotOp::Confirm => "confirm_payment",
            SlotOp::RevertToPending(_) => "revert_to_pending",
        }
    }

    /// Decide the writes for this operation from state read inside the
    /// transaction. Pure, so every store applies the same rule.
    pub fn plan(&self, snapshot: &SlotSnapshot) -> LedgerResult<SlotMutation> {
        match self {
            SlotOp::Confirm => {
                if snapshot.slots_allotted >= snapshot.slots_total {
                    return Err(LedgerError::CapacityExceeded {
                        tournament_id: snapshot.tournament_id.clone(),
                        slots_total: snapshot.slots_total,
                    });
                }
                // A registration that is already confirmed holds its slot.
                let slot_delta = match snapshot.registration_status {
                    PaymentStatus::Confirmed => 0,
                    PaymentStatus::Pending => 1,
                };
                Ok(SlotMutation {
                    payment_status: PaymentStatus::Confirmed,
                    slot_delta,
                })
            }
            SlotOp::RevertToPending(RevertMode::Unconditional) => Ok(SlotMutation {
                payment_status: PaymentStatus::Pending,
                slot_delta: -1,
            }),
            SlotOp::RevertToPending(RevertMode::Guarded) => {
                let holds_slot = snapshot.registration_status == PaymentStatus::Confirmed
                    && snapshot.slots_allotted > 0;
                Ok(SlotMutation {
                    payment_status: PaymentStatus::Pending,
                    slot_delta: if holds_slot { -1 } else { 0 },
                })
            }
        }
    }
}

/// State read inside a slot transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub tournament_id: TournamentId,
    pub slots_total: i64,
    pub slots_allotted: i64,
    /// Tournament version observed by the read
    pub version: i64,
    pub registration_status: PaymentStatus,
}

/// Writes decided by [`SlotOp::plan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMutation {
    pub payment_status: PaymentStatus,
    pub slot_delta: i64,
}

/// Result of a committed slot transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOutcome {
    pub registration_id: RegistrationId,
    pub tournament_id: TournamentId,
    pub payment_status: PaymentStatus,
    /// Status read by the committed attempt
    pub previous_status: PaymentStatus,
    pub slots_allotted: i64,
    pub slots_total: i64,
    /// Attempts used, including conflicting ones
    pub attempts: u32,
}

/// Ledger configuration.
///
/// The server fills this from `LEDGER_MAX_ATTEMPTS` and `LEDGER_REVERT_MODE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Attempts per slot transaction before it is aborted
    pub max_attempts: u32,
    pub revert_mode: RevertMode,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            revert_mode: RevertMode::default(),
        }
    }
}

/// Validate a tournament reference taken from a registration.
///
/// Rejects absent, blank, or path-like references, and ones longer than
/// [`MAX_REFERENCE_LEN`].
pub fn validate_reference(reference: Option<&str>) -> LedgerResult<&str> {
    let reference = reference
        .ok_or_else(|| LedgerError::InvalidReference("tournament reference is missing".to_string()))?;

    if reference.trim().is_empty() {
        return Err(LedgerError::InvalidReference(
            "tournament reference is empty".to_string(),
        ));
    }

    if reference.len() > MAX_REFERENCE_LEN
        || reference.contains('/')
        || reference == "."
        || reference == ".."
        || reference.chars().any(char::is_control)
    {
        return Err(LedgerError::InvalidReference(format!(
            "malformed tournament reference '{}'",
            reference.escape_debug()
        )));
    }

    Ok(reference)
}
