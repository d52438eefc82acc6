//! PostgreSQL document store.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use log::debug;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use super::errors::{StoreError, StoreResult};
use super::repository::{
    RegistrationRepository, SlotTransactions, StoreHealth, TournamentRepository,
};
use super::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_default_timeout, with_timeout};
use crate::ledger::{LedgerError, LedgerResult, SlotOp, SlotOutcome, SlotSnapshot};
use crate::registration::{PaymentStatus, Registration, RegistrationFilter};
use crate::tournament::Tournament;

const TOURNAMENT_COLUMNS: &str = "id, title, game, match_date, match_time, entry_fee, prize_pool, \
     slots_total, slots_allotted, status, rules, version, created_at";

const REGISTRATION_COLUMNS: &str = "id, tournament_id, tournament_title, user_id, user_email, \
     game_id, team_name, upi_id, payment_status, registered_at";

/// PostgreSQL-backed store.
///
/// Slot transactions are optimistic: the tournament row is read without a
/// lock and updated with `WHERE version = $read_version`. Zero affected rows
/// means another transaction won, so the attempt is rolled back and re-run.
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// One read-plan-commit attempt. `Ok(None)` signals a conflict; the
    /// transaction is rolled back when it is dropped uncommitted.
    async fn attempt_slot_transaction(
        &self,
        registration_id: &str,
        tournament_id: &str,
        op: SlotOp,
        attempt: u32,
    ) -> LedgerResult<Option<SlotOutcome>> {
        let mut tx = with_timeout(DEFAULT_TRANSACTION_TIMEOUT, self.pool.begin()).await?;

        let tournament = sqlx::query(
            "SELECT slots_total, slots_allotted, version FROM tournaments WHERE id = $1",
        )
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| LedgerError::tournament_not_found(tournament_id))?;

        let registration = sqlx::query("SELECT payment_status FROM registrations WHERE id = $1")
            .bind(registration_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| LedgerError::registration_not_found(registration_id))?;

        let status: String = registration.try_get("payment_status")?;
        let registration_status: PaymentStatus = status.parse().map_err(|reason| {
            LedgerError::from(StoreError::Corrupt {
                collection: "registrations",
                id: registration_id.to_string(),
                reason,
            })
        })?;

        let snapshot = SlotSnapshot {
            tournament_id: tournament_id.to_string(),
            slots_total: tournament.try_get("slots_total")?,
            slots_allotted: tournament.try_get("slots_allotted")?,
            version: tournament.try_get("version")?,
            registration_status,
        };
        let mutation = op.plan(&snapshot)?;

        let updated = sqlx::query(
            r#"
            UPDATE tournaments
            SET slots_allotted = slots_allotted + $1, version = version + 1
            WHERE id = $2 AND version = $3
            RETURNING slots_allotted, slots_total
            "#,
        )
        .bind(mutation.slot_delta)
        .bind(tournament_id)
        .bind(snapshot.version)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        let result = sqlx::query(
            "UPDATE registrations SET payment_status = $1 WHERE id = $2 AND payment_status = $3",
        )
        .bind(mutation.payment_status.to_string())
        .bind(registration_id)
        .bind(snapshot.registration_status.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit().await?;

        Ok(Some(SlotOutcome {
            registration_id: registration_id.to_string(),
            tournament_id: tournament_id.to_string(),
            payment_status: mutation.payment_status,
            previous_status: snapshot.registration_status,
            slots_allotted: updated.try_get("slots_allotted")?,
            slots_total: updated.try_get("slots_total")?,
            attempts: attempt,
        }))
    }
}

fn corrupt(collection: &'static str, id: &str, reason: impl ToString) -> StoreError {
    StoreError::Corrupt {
        collection,
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn tournament_from_row(row: &PgRow) -> StoreResult<Tournament> {
    let id: String = row.try_get("id")?;
    let game: String = row.try_get("game")?;
    let status: String = row.try_get("status")?;
    let rules: serde_json::Value = row.try_get("rules")?;

    Ok(Tournament {
        game: game.parse().map_err(|e| corrupt("tournaments", &id, e))?,
        status: status.parse().map_err(|e| corrupt("tournaments", &id, e))?,
        rules: serde_json::from_value(rules).map_err(|e| corrupt("tournaments", &id, e))?,
        title: row.try_get("title")?,
        date: row.try_get("match_date")?,
        time: row.try_get("match_time")?,
        entry_fee: row.try_get("entry_fee")?,
        prize_pool: row.try_get("prize_pool")?,
        slots_total: row.try_get("slots_total")?,
        slots_allotted: row.try_get("slots_allotted")?,
        version: row.try_get("version")?,
        created_at: row.try_get("created_at")?,
        id,
    })
}

fn registration_from_row(row: &PgRow) -> StoreResult<Registration> {
    let id: String = row.try_get("id")?;
    let status: String = row.try_get("payment_status")?;

    Ok(Registration {
        payment_status: status.parse().map_err(|e| corrupt("registrations", &id, e))?,
        tournament_id: row.try_get("tournament_id")?,
        tournament_title: row.try_get("tournament_title")?,
        user_id: row.try_get("user_id")?,
        user_email: row.try_get("user_email")?,
        game_id: row.try_get("game_id")?,
        team_name: row.try_get("team_name")?,
        upi_id: row.try_get("upi_id")?,
        registered_at: row.try_get("registered_at")?,
        id,
    })
}

/// Escape `LIKE` wildcards so a search term matches literally
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

#[async_trait]
impl TournamentRepository for PgStore {
    async fn insert_tournament(&self, tournament: &Tournament) -> StoreResult<()> {
        let rules = serde_json::to_value(&tournament.rules)
            .map_err(|e| corrupt("tournaments", &tournament.id, e))?;

        let result = sqlx::query(
            r#"
            INSERT INTO tournaments (id, title, game, match_date, match_time, entry_fee, prize_pool,
                                     slots_total, slots_allotted, status, rules, version, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&tournament.id)
        .bind(&tournament.title)
        .bind(tournament.game.to_string())
        .bind(tournament.date)
        .bind(tournament.time)
        .bind(tournament.entry_fee)
        .bind(tournament.prize_pool)
        .bind(tournament.slots_total)
        .bind(tournament.slots_allotted)
        .bind(tournament.status.to_string())
        .bind(rules)
        .bind(tournament.version)
        .bind(tournament.created_at)
        .execute(self.pool.as_ref())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate {
                collection: "tournaments",
                id: tournament.id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_tournament(&self, id: &str) -> StoreResult<Option<Tournament>> {
        let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1");
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(id)
                .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        row.as_ref().map(tournament_from_row).transpose()
    }

    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        let sql = format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments ORDER BY match_date DESC, match_time DESC"
        );
        let rows = with_default_timeout(sqlx::query(&sql).fetch_all(self.pool.as_ref())).await?;

        rows.iter().map(tournament_from_row).collect()
    }
}

#[async_trait]
impl RegistrationRepository for PgStore {
    async fn insert_registration(&self, registration: &Registration) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO registrations (id, tournament_id, tournament_title, user_id, user_email,
                                       game_id, team_name, upi_id, payment_status, registered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&registration.id)
        .bind(&registration.tournament_id)
        .bind(&registration.tournament_title)
        .bind(&registration.user_id)
        .bind(&registration.user_email)
        .bind(&registration.game_id)
        .bind(&registration.team_name)
        .bind(&registration.upi_id)
        .bind(registration.payment_status.to_string())
        .bind(registration.registered_at)
        .execute(self.pool.as_ref())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate {
                collection: "registrations",
                id: registration.id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_registration(&self, id: &str) -> StoreResult<Option<Registration>> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1");
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(id)
                .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        row.as_ref().map(registration_from_row).transpose()
    }

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> StoreResult<Vec<Registration>> {
        let sql = format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM registrations
            WHERE ($1::TEXT IS NULL OR payment_status = $1)
              AND ($2::TEXT IS NULL OR tournament_id = $2)
              AND ($3::TEXT IS NULL
                   OR LOWER(user_email) LIKE $3
                   OR LOWER(game_id) LIKE $3
                   OR LOWER(upi_id) LIKE $3)
            ORDER BY registered_at DESC
            LIMIT $4
            "#
        );

        let rows = with_default_timeout(
            sqlx::query(&sql)
                .bind(filter.status.map(|s| s.to_string()))
                .bind(filter.tournament_id.as_deref())
                .bind(filter.search_term().map(|term| like_pattern(&term)))
                .bind(filter.limit)
                .fetch_all(self.pool.as_ref()),
        )
        .await?;

        rows.iter().map(registration_from_row).collect()
    }
}

#[async_trait]
impl SlotTransactions for PgStore {
    async fn run_slot_transaction(
        &self,
        registration_id: &str,
        tournament_id: &str,
        op: SlotOp,
        max_attempts: u32,
    ) -> LedgerResult<SlotOutcome> {
        let max_attempts = max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self
                .attempt_slot_transaction(registration_id, tournament_id, op, attempt)
                .await?
            {
                Some(outcome) => return Ok(outcome),
                None => debug!(
                    "{} on {}/{} lost a version race (attempt {}/{})",
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
impl StoreHealth for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(self.pool.as_ref())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
