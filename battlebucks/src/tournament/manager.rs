//! Tournament manager for creating and listing tournaments.

use super::errors::{TournamentError, TournamentResult};
use super::models::{NewTournament, Tournament, TournamentStatus};
use crate::db::LedgerStore;
use chrono::Utc;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    store: Arc<dyn LedgerStore>,
}

impl TournamentManager {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Create a tournament with no confirmed slots
    pub async fn create_tournament(&self, new: NewTournament) -> TournamentResult<Tournament> {
        validate(&new)?;

        let tournament = Tournament {
            id: Uuid::new_v4().simple().to_string(),
            title: new.title.trim().to_string(),
            game: new.game,
            date: new.date,
            time: new.time,
            entry_fee: new.entry_fee,
            prize_pool: new.prize_pool,
            slots_total: new.slots_total,
            slots_allotted: 0,
            status: TournamentStatus::Upcoming,
            rules: new
                .rules
                .into_iter()
                .map(|rule| rule.trim().to_string())
                .filter(|rule| !rule.is_empty())
                .collect(),
            version: 0,
            created_at: Utc::now(),
        };

        self.store.insert_tournament(&tournament).await?;
        info!(
            "Created tournament {} '{}' with {} slots",
            tournament.id, tournament.title, tournament.slots_total
        );

        Ok(tournament)
    }

    pub async fn get_tournament(&self, id: &str) -> TournamentResult<Tournament> {
        self.store
            .find_tournament(id)
            .await?
            .ok_or_else(|| TournamentError::NotFound(id.to_string()))
    }

    /// All tournaments, latest match first
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        Ok(self.store.list_tournaments().await?)
    }
}

fn validate(new: &NewTournament) -> TournamentResult<()> {
    let invalid = |field, reason: &str| {
        Err(TournamentError::InvalidField {
            field,
            reason: reason.to_string(),
        })
    };

    if new.title.trim().is_empty() {
        return invalid("title", "must not be empty");
    }
    if new.slots_total <= 0 {
        return invalid("slots_total", "must be positive");
    }
    if new.entry_fee < 0 {
        return invalid("entry_fee", "must not be negative");
    }
    if new.prize_pool < 0 {
        return invalid("prize_pool", "must not be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::tournament::Game;
    use chrono::{NaiveDate, NaiveTime};

    fn new_tournament(title: &str, slots_total: i64) -> NewTournament {
        NewTournament {
            title: title.to_string(),
            game: Game::Pubg,
            date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            entry_fee: 50,
            prize_pool: 2000,
            slots_total,
            rules: vec!["No emulators".to_string(), "  ".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_starts_empty_and_upcoming() {
        let manager = TournamentManager::new(Arc::new(MemoryStore::new()));
        let created = manager
            .create_tournament(new_tournament(" Erangel Squads ", 25))
            .await
            .unwrap();

        assert_eq!(created.title, "Erangel Squads");
        assert_eq!(created.slots_allotted, 0);
        assert_eq!(created.status, TournamentStatus::Upcoming);
        assert_eq!(created.rules, vec!["No emulators".to_string()]);

        let fetched = manager.get_tournament(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_zero_slots() {
        let manager = TournamentManager::new(Arc::new(MemoryStore::new()));
        let err = manager
            .create_tournament(new_tournament("Empty", 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TournamentError::InvalidField {
                field: "slots_total",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let manager = TournamentManager::new(Arc::new(MemoryStore::new()));
        let err = manager.get_tournament("nope").await.unwrap_err();
        assert!(matches!(err, TournamentError::NotFound(id) if id == "nope"));
    }
}
