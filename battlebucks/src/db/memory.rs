//! In-process document store.
//!
//! Documents carry a version and slot transactions use the same optimistic
//! protocol as [`PgStore`](super::PgStore): read a snapshot, plan, then
//! commit only if the tournament version and registration status are still
//! what was read. The store also exposes fault injection hooks so callers
//! can observe abort and conflict handling.

use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::errors::{StoreError, StoreResult};
use super::repository::{
    RegistrationRepository, SlotTransactions, StoreHealth, TournamentRepository,
};
use crate::ledger::{
    LedgerError, LedgerResult, SlotMutation, SlotOp, SlotOutcome,
    SlotSnapshot,
};
use crate::registration::{Registration, RegistrationFilter};
use crate::tournament::Tournament;

/// In-memory store with optimistic slot transactions
pub struct MemoryStore {
    tournaments: RwLock<HashMap<String, Tournament>>,
    registrations: RwLock<HashMap<String, Registration>>,
    fail_next_commit: Mutex<Option<String>>,
    forced_conflicts: AtomicU32,
    transactions_started: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tournaments: RwLock::new(HashMap::new()),
            registrations: RwLock::new(HashMap::new()),
            fail_next_commit: Mutex::new(None),
            forced_conflicts: AtomicU32::new(0),
            transactions_started: AtomicU64::new(0),
        }
    }

    /// Seed a tournament, replacing any document with the same ID
    pub fn with_tournament(self, tournament: Tournament) -> Self {
        if let Ok(mut map) = self.tournaments.write() {
            map.insert(tournament.id.clone(), tournament);
        }
        self
    }

    /// Seed a registration, replacing any document with the same ID
    pub fn with_registration(self, registration: Registration) -> Self {
        if let Ok(mut map) = self.registrations.write() {
            map.insert(registration.id.clone(), registration);
        }
        self
    }

    /// Make the next commit abort with `reason` before writing anything
    pub fn fail_next_commit(&self, reason: impl Into<String>) {
        if let Ok(mut slot) = self.fail_next_commit.lock() {
            *slot = Some(reason.into());
        }
    }

    /// Make the next `n` commits observe a conflicting writer
    pub fn force_conflicts(&self, n: u32) {
        self.forced_conflicts.store(n, Ordering::SeqCst);
    }

    /// Number of slot transactions that reached the store
    pub fn transactions_started(&self) -> u64 {
        self.transactions_started.load(Ordering::SeqCst)
    }

    fn read_tournaments(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Tournament>>> {
        self.tournaments.read().map_err(|_| poisoned())
    }

    fn read_registrations(
        &self,
    ) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Registration>>> {
        self.registrations.read().map_err(|_| poisoned())
    }

    fn write_tournaments(
        &self,
    ) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Tournament>>> {
        self.tournaments.write().map_err(|_| poisoned())
    }

    fn write_registrations(
        &self,
    ) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Registration>>> {
        self.registrations.write().map_err(|_| poisoned())
    }

    fn read_snapshot(&self, registration_id: &str, tournament_id: &str) -> LedgerResult<SlotSnapshot> {
        let tournaments = self.read_tournaments()?;
        let tournament = tournaments
            .get(tournament_id)
            .ok_or_else(|| LedgerError::tournament_not_found(tournament_id))?;

        let registrations = self.read_registrations()?;
        let registration = registrations
            .get(registration_id)
            .ok_or_else(|| LedgerError::registration_not_found(registration_id))?;

        Ok(SlotSnapshot {
            tournament_id: tournament.id.clone(),
            slots_total: tournament.slots_total,
            slots_allotted: tournament.slots_allotted,
            version: tournament.version,
            registration_status: registration.payment_status,
        })
    }

    /// Apply `mutation` if nothing changed since `snapshot` was read.
    /// `Ok(None)` signals a conflict.
    fn commit(
        &self,
        registration_id: &str,
        snapshot: &SlotSnapshot,
        mutation: SlotMutation,
        attempt: u32,
    ) -> LedgerResult<Option<SlotOutcome>> {
        let injected = self.fail_next_commit.lock().map_err(|_| poisoned())?.take();
        if let Some(reason) = injected {
            return Err(LedgerError::TransactionAborted(reason));
        }

        // Lock order: tournaments, then registrations
        let mut tournaments = self.write_tournaments()?;
        let mut registrations = self.write_registrations()?;

        if self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Ok(None);
        }

        let tournament = tournaments
            .get_mut(&snapshot.tournament_id)
            .ok_or_else(|| LedgerError::tournament_not_found(&snapshot.tournament_id))?;
        let registration = registrations
            .get_mut(registration_id)
            .ok_or_else(|| LedgerError::registration_not_found(registration_id))?;

        if tournament.version != snapshot.version
            || registration.payment_status != snapshot.registration_status
        {
            return Ok(None);
        }

        tournament.slots_allotted += mutation.slot_delta;
        tournament.version += 1;
        registration.payment_status = mutation.payment_status;

        Ok(Some(SlotOutcome {
            registration_id: registration.id.clone(),
            tournament_id: tournament.id.clone(),
            payment_status: registration.payment_status,
            previous_status: snapshot.registration_status,
            slots_allotted: tournament.slots_allotted,
            slots_total: tournament.slots_total,
            attempts: attempt,
        }))
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".to_string())
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn insert_tournament(&self, tournament: &Tournament) -> StoreResult<()> {
        let mut tournaments = self.write_tournaments()?;
        if tournaments.contains_key(&tournament.id) {
            return Err(StoreError::Duplicate {
                collection: "tournaments",
                id: tournament.id.clone(),
            });
        }
        tournaments.insert(tournament.id.clone(), tournament.clone());
        Ok(())
    }

    async fn find_tournament(&self, id: &str) -> StoreResult<Option<Tournament>> {
        Ok(self.read_tournaments()?.get(id).cloned())
    }

    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        let mut tournaments: Vec<Tournament> = self.read_tournaments()?.values().cloned().collect();
        tournaments.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
        Ok(tournaments)
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn insert_registration(&self, registration: &Registration) -> StoreResult<()> {
        let mut registrations = self.write_registrations()?;
        if registrations.contains_key(&registration.id) {
            return Err(StoreError::Duplicate {
                collection: "registrations",
                id: registration.id.clone(),
            });
        }
        registrations.insert(registration.id.clone(), registration.clone());
        Ok(())
    }

    async fn find_registration(&self, id: &str) -> StoreResult<Option<Registration>> {
        Ok(self.read_registrations()?.get(id).cloned())
    }

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> StoreResult<Vec<Registration>> {
        let mut registrations: Vec<Registration> = self
            .read_registrations()?
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        registrations.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));

        if let Some(limit) = filter.limit {
            registrations.truncate(limit.max(0) as usize);
        }
        Ok(registrations)
    }
}

#[async_trait]
impl SlotTransactions for MemoryStore {
    async fn run_slot_transaction(
        &self,
        registration_id: &str,
        tournament_id: &str,
        op: SlotOp,
        max_attempts: u32,
    ) -> LedgerResult<SlotOutcome> {
        self.transactions_started.fetch_add(1, Ordering::SeqCst);
        let max_attempts = max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let snapshot = self.read_snapshot(registration_id, tournament_id)?;
            let mutation = op.plan(&snapshot)?;

            // Give concurrent transactions a chance to interleave between
            // read and commit, as they would against a remote store.
            tokio::task::yield_now().await;

            match self.commit(registration_id, &snapshot, mutation, attempt)? {
                Some(outcome) => return Ok(outcome),
                None => debug!(
                    "{} on {}/{} conflicted (attempt {}/{})",
                    op.name(),
                    tournament_id,
                    registration_id,
                    attempt,
                    max_attempts
                ),
            }
        }

        Err(LedgerError::TransactionAborted(format!(
            "write conflict on tournament {tournament_id} persisted after {max_attempts} attempts"
        )))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.read_tournaments().map(|_| ())
    }
}
