//! Registration ledger: payment confirmation and reversal.

use super::errors::LedgerResult;
use super::models::{LedgerConfig, SlotOp, SlotOutcome, validate_reference};
use crate::db::LedgerStore;
use crate::identity::CallerIdentity;
use crate::notify::{ConfirmationMessage, NotificationSink};
use crate::registration::PaymentStatus;
use log::{info, warn};
use std::sync::Arc;

/// Keeps each tournament's `slots_allotted` equal to its number of confirmed
/// registrations.
///
/// Every operation is a single store transaction; there are no locks here.
/// The caller identity is only used for the audit log.
#[derive(Clone)]
pub struct RegistrationLedger {
    store: Arc<dyn LedgerStore>,
    sink: Arc<dyn NotificationSink>,
    config: LedgerConfig,
}

impl RegistrationLedger {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        sink: Arc<dyn NotificationSink>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            store,
            sink,
            config,
        }
    }

    /// Confirm a registration's payment, consuming one tournament slot.
    ///
    /// On success a confirmation message is drafted and delivered on a
    /// detached task; delivery failures are logged and do not affect the
    /// result. Confirming an already confirmed registration is a no-op on
    /// the counter and sends no second message.
    ///
    /// # Errors
    ///
    /// - `InvalidReference` if `tournament_id` is absent or malformed (no
    ///   store access happens)
    /// - `NotFound` if the tournament or registration is gone
    /// - `CapacityExceeded` if every slot is already confirmed
    /// - `TransactionAborted` if the store gave up or failed
    pub async fn confirm_payment(
        &self,
        caller: &CallerIdentity,
        registration_id: &str,
        tournament_id: Option<&str>,
    ) -> LedgerResult<SlotOutcome> {
        let outcome = self
            .apply(caller, registration_id, tournament_id, SlotOp::Confirm)
            .await?;
        if outcome.previous_status != PaymentStatus::Confirmed {
            self.spawn_confirmation(outcome.registration_id.clone(), outcome.tournament_id.clone());
        }
        Ok(outcome)
    }

    /// Move a registration back to pending, releasing its slot according to
    /// the configured [`RevertMode`](super::RevertMode).
    pub async fn revert_to_pending(
        &self,
        caller: &CallerIdentity,
        registration_id: &str,
        tournament_id: Option<&str>,
    ) -> LedgerResult<SlotOutcome> {
        let op = SlotOp::RevertToPending(self.config.revert_mode);
        self.apply(caller, registration_id, tournament_id, op).await
    }

    async fn apply(
        &self,
        caller: &CallerIdentity,
        registration_id: &str,
        tournament_id: Option<&str>,
        op: SlotOp,
    ) -> LedgerResult<SlotOutcome> {
        let tournament_id = validate_reference(tournament_id).inspect_err(|e| {
            warn!("{} rejected {} for {}: {}", op.name(), caller, registration_id, e);
        })?;

        let result = self
            .store
            .run_slot_transaction(registration_id, tournament_id, op, self.config.max_attempts)
            .await;

        match &result {
            Ok(outcome) => info!(
                "{} {} registration {} in tournament {}: {}/{} slots ({} attempt(s))",
                caller,
                op.name(),
                registration_id,
                tournament_id,
                outcome.slots_allotted,
                outcome.slots_total,
                outcome.attempts
            ),
            Err(e) => warn!(
                "{} {} registration {} in tournament {} failed: {}",
                caller,
                op.name(),
                registration_id,
                tournament_id,
                e
            ),
        }

        result
    }

    /// Draft and deliver the confirmation message off the request path
    fn spawn_confirmation(&self, registration_id: String, tournament_id: String) {
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);

        tokio::spawn(async move {
            let registration = match store.find_registration(&registration_id).await {
                Ok(Some(registration)) => registration,
                Ok(None) => {
                    warn!("Confirmation skipped: registration {} vanished", registration_id);
                    return;
                }
                Err(e) => {
                    warn!("Confirmation skipped for {}: {}", registration_id, e);
                    return;
                }
            };
            let tournament = match store.find_tournament(&tournament_id).await {
                Ok(Some(tournament)) => tournament,
                Ok(None) => {
                    warn!("Confirmation skipped: tournament {} vanished", tournament_id);
                    return;
                }
                Err(e) => {
                    warn!("Confirmation skipped for {}: {}", registration_id, e);
                    return;
                }
            };

            let message = ConfirmationMessage::draft(&registration, &tournament);
            let recipient = message.recipient.clone();
            if let Err(e) = sink.deliver(message).await {
                warn!("Confirmation for {} to {} not delivered: {}", registration_id, recipient, e);
            }
        });
    }
}
