//! Document store traits.
//!
//! The ledger and managers only see these traits, so the same code runs on
//! PostgreSQL in production and on [`MemoryStore`](super::MemoryStore) in
//! tests and local development.

use async_trait::async_trait;

use super::errors::StoreResult;
use crate::ledger::{LedgerResult, SlotOp, SlotOutcome};
use crate::registration::{Registration, RegistrationFilter};
use crate::tournament::Tournament;

/// `tournaments` collection
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Insert a new tournament document
    async fn insert_tournament(&self, tournament: &Tournament) -> StoreResult<()>;

    /// Find tournament by ID
    async fn find_tournament(&self, id: &str) -> StoreResult<Option<Tournament>>;

    /// All tournaments, latest match date first
    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>>;
}

/// `registrations` collection
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Insert a new registration document
    async fn insert_registration(&self, registration: &Registration) -> StoreResult<()>;

    /// Find registration by ID
    async fn find_registration(&self, id: &str) -> StoreResult<Option<Registration>>;

    /// Registrations matching `filter`, most recent first
    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> StoreResult<Vec<Registration>>;
}

/// Atomic slot accounting across a registration and its tournament
#[async_trait]
pub trait SlotTransactions: Send + Sync {
    /// Run `op` as one transaction.
    ///
    /// The tournament and registration are read, [`SlotOp::plan`] decides
    /// the writes, and both writes commit together or not at all. A
    /// concurrent change to the tournament between read and commit discards
    /// the attempt and re-runs it on fresh data, up to `max_attempts`
    /// attempts (at least one), after which `TransactionAborted` is
    /// returned. Business-rule rejections are never retried.
    async fn run_slot_transaction(
        &self,
        registration_id: &str,
        tournament_id: &str,
        op: SlotOp,
        max_attempts: u32,
    ) -> LedgerResult<SlotOutcome>;
}

/// Liveness probe
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

/// Everything the application needs from a store
pub trait LedgerStore:
    TournamentRepository + RegistrationRepository + SlotTransactions + StoreHealth
{
}

impl<T> LedgerStore for T where
    T: TournamentRepository + RegistrationRepository + SlotTransactions + StoreHealth
{
}
