//! Registration manager: intake, listings and dashboard figures.

use super::errors::{RegistrationError, RegistrationResult};
use super::models::{DashboardSummary, NewRegistration, PaymentStatus, Registration};
use super::query::RegistrationFilter;
use crate::db::LedgerStore;
use crate::identity::CallerIdentity;
use crate::tournament::TournamentStatus;
use chrono::Utc;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Number of registrations shown on the dashboard
pub const RECENT_REGISTRATIONS: usize = 5;

const MIN_GAME_ID_LEN: usize = 5;
const MIN_TEAM_NAME_LEN: usize = 2;
const MIN_UPI_ID_LEN: usize = 3;

/// Registration manager
#[derive(Clone)]
pub struct RegistrationManager {
    store: Arc<dyn LedgerStore>,
}

impl RegistrationManager {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Register the caller for a tournament.
    ///
    /// The registration starts `Pending` and does not consume a slot until
    /// an admin confirms the payment.
    ///
    /// # Errors
    ///
    /// - `InvalidField` if a form field fails validation
    /// - `MissingEmail` if the caller identity has no email
    /// - `TournamentNotFound` if the tournament does not exist
    /// - `TournamentClosed` if the tournament is completed
    pub async fn register(
        &self,
        caller: &CallerIdentity,
        form: NewRegistration,
    ) -> RegistrationResult<Registration> {
        let form = validate(form)?;

        let user_email = caller
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or(RegistrationError::MissingEmail)?;

        let tournament = self
            .store
            .find_tournament(&form.tournament_id)
            .await?
            .ok_or_else(|| RegistrationError::TournamentNotFound(form.tournament_id.clone()))?;

        if tournament.status == TournamentStatus::Completed {
            warn!(
                "{} tried to register for completed tournament {}",
                caller, tournament.id
            );
            return Err(RegistrationError::TournamentClosed(tournament.id));
        }

        let registration = Registration {
            id: Uuid::new_v4().simple().to_string(),
            tournament_id: Some(tournament.id.clone()),
            tournament_title: tournament.title.clone(),
            user_id: caller.uid.clone(),
            user_email: user_email.to_string(),
            game_id: form.game_id,
            team_name: form.team_name,
            upi_id: form.upi_id,
            payment_status: PaymentStatus::Pending,
            registered_at: Utc::now(),
        };

        self.store.insert_registration(&registration).await?;
        info!(
            "{} registered team '{}' for tournament {} ({})",
            caller, registration.team_name, tournament.id, registration.id
        );

        Ok(registration)
    }

    pub async fn get_registration(&self, id: &str) -> RegistrationResult<Registration> {
        self.store
            .find_registration(id)
            .await?
            .ok_or_else(|| RegistrationError::NotFound(id.to_string()))
    }

    /// Registrations matching `filter`, most recent first
    pub async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> RegistrationResult<Vec<Registration>> {
        Ok(self.store.list_registrations(filter).await?)
    }

    /// Compute the admin dashboard figures.
    ///
    /// Revenue sums the entry fee of each confirmed registration's
    /// tournament; registrations whose tournament is gone contribute nothing.
    pub async fn dashboard(&self) -> RegistrationResult<DashboardSummary> {
        let tournaments = self.store.list_tournaments().await?;
        let registrations = self
            .store
            .list_registrations(&RegistrationFilter::all())
            .await?;

        let entry_fees: HashMap<&str, i64> = tournaments
            .iter()
            .map(|t| (t.id.as_str(), t.entry_fee))
            .collect();

        let mut summary = DashboardSummary {
            confirmed_revenue: 0,
            confirmed_count: 0,
            pending_count: 0,
            live_tournaments: tournaments
                .iter()
                .filter(|t| t.status == TournamentStatus::Ongoing)
                .count(),
            recent_registrations: Vec::new(),
        };

        for registration in &registrations {
            match registration.payment_status {
                PaymentStatus::Confirmed => {
                    summary.confirmed_count += 1;
                    summary.confirmed_revenue += registration
                        .tournament_id
                        .as_deref()
                        .and_then(|id| entry_fees.get(id))
                        .copied()
                        .unwrap_or(0);
                }
                PaymentStatus::Pending => summary.pending_count += 1,
            }
        }

        summary.recent_registrations = registrations
            .into_iter()
            .take(RECENT_REGISTRATIONS)
            .collect();

        Ok(summary)
    }
}

fn validate(form: NewRegistration) -> RegistrationResult<NewRegistration> {
    fn invalid<T>(field: &'static str, reason: &str) -> RegistrationResult<T> {
        Err(RegistrationError::InvalidField {
            field,
            reason: reason.to_string(),
        })
    }

    let form = NewRegistration {
        tournament_id: form.tournament_id.trim().to_string(),
        game_id: form.game_id.trim().to_string(),
        team_name: form.team_name.trim().to_string(),
        upi_id: form.upi_id.trim().to_string(),
    };

    if form.tournament_id.is_empty() {
        return invalid("tournament_id", "Please choose a tournament");
    }
    if form.game_id.chars().count() < MIN_GAME_ID_LEN {
        return invalid("game_id", "Please enter a valid Game ID");
    }
    if form.team_name.chars().count() < MIN_TEAM_NAME_LEN {
        return invalid("team_name", "Please enter your team name");
    }
    if form.upi_id.chars().count() < MIN_UPI_ID_LEN {
        return invalid("upi_id", "Please enter a valid UPI ID");
    }
    if !form.upi_id.contains('@') {
        return invalid("upi_id", "UPI ID must contain '@'");
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, TournamentRepository};
    use crate::tournament::{Game, Tournament};
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn tournament(id: &str, entry_fee: i64, status: TournamentStatus) -> Tournament {
        Tournament {
            id: id.to_string(),
            title: format!("Cup {id}"),
            game: Game::FreeFire,
            date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            entry_fee,
            prize_pool: 1000,
            slots_total: 10,
            slots_allotted: 0,
            status,
            rules: vec![],
            version: 0,
            created_at: Utc::now(),
        }
    }

    fn registration(id: &str, tournament_id: &str, status: PaymentStatus, age_mins: i64) -> Registration {
        Registration {
            id: id.to_string(),
            tournament_id: Some(tournament_id.to_string()),
            tournament_title: format!("Cup {tournament_id}"),
            user_id: format!("user-{id}"),
            user_email: format!("{id}@example.com"),
            game_id: "5123456789".to_string(),
            team_name: "Squad".to_string(),
            upi_id: format!("{id}@upi"),
            payment_status: status,
            registered_at: Utc::now() - Duration::minutes(age_mins),
        }
    }

    fn form(tournament_id: &str) -> NewRegistration {
        NewRegistration {
            tournament_id: tournament_id.to_string(),
            game_id: "5123456789".to_string(),
            team_name: "Night Owls".to_string(),
            upi_id: "owls@okbank".to_string(),
        }
    }

    fn player() -> CallerIdentity {
        CallerIdentity::player("u1", "owl@example.com")
    }

    #[tokio::test]
    async fn test_register_creates_pending() {
        let store = Arc::new(MemoryStore::new().with_tournament(tournament(
            "t1",
            50,
            TournamentStatus::Upcoming,
        )));
        let manager = RegistrationManager::new(store.clone());

        let registration = manager.register(&player(), form("t1")).await.unwrap();
        assert_eq!(registration.payment_status, PaymentStatus::Pending);
        assert_eq!(registration.tournament_title, "Cup t1");
        assert_eq!(registration.user_email, "owl@example.com");

        let stored = manager.get_registration(&registration.id).await.unwrap();
        assert_eq!(stored, registration);

        // Intake never touches the slot counter
        let t = store.find_tournament("t1").await.unwrap().unwrap();
        assert_eq!(t.slots_allotted, 0);
    }

    #[tokio::test]
    async fn test_register_validates_fields() {
        let store = Arc::new(MemoryStore::new().with_tournament(tournament(
            "t1",
            50,
            TournamentStatus::Upcoming,
        )));
        let manager = RegistrationManager::new(store);

        let mut short_game_id = form("t1");
        short_game_id.game_id = "1234".to_string();
        let err = manager.register(&player(), short_game_id).await.unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidField { field: "game_id", .. }));

        let mut no_at = form("t1");
        no_at.upi_id = "owlsbank".to_string();
        let err = manager.register(&player(), no_at).await.unwrap_err();
        assert_eq!(err.client_message(), "UPI ID must contain '@'");

        let mut short_team = form("t1");
        short_team.team_name = " A ".to_string();
        let err = manager.register(&player(), short_team).await.unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidField { field: "team_name", .. }));
    }

    #[tokio::test]
    async fn test_register_refuses_completed_and_missing() {
        let store = Arc::new(MemoryStore::new().with_tournament(tournament(
            "done",
            50,
            TournamentStatus::Completed,
        )));
        let manager = RegistrationManager::new(store);

        let err = manager.register(&player(), form("done")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::TournamentClosed(_)));

        let err = manager.register(&player(), form("ghost")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::TournamentNotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_register_requires_email() {
        let store = Arc::new(MemoryStore::new().with_tournament(tournament(
            "t1",
            50,
            TournamentStatus::Upcoming,
        )));
        let manager = RegistrationManager::new(store);

        let caller = CallerIdentity {
            uid: "u2".to_string(),
            email: None,
            is_admin: false,
        };
        let err = manager.register(&caller, form("t1")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::MissingEmail));
    }

    #[tokio::test]
    async fn test_dashboard_summary() {
        let mut store = MemoryStore::new()
            .with_tournament(tournament("a", 50, TournamentStatus::Upcoming))
            .with_tournament(tournament("b", 30, TournamentStatus::Ongoing))
            .with_tournament(tournament("c", 100, TournamentStatus::Completed));

        store = store
            .with_registration(registration("r1", "a", PaymentStatus::Confirmed, 70))
            .with_registration(registration("r2", "a", PaymentStatus::Confirmed, 60))
            .with_registration(registration("r3", "b", PaymentStatus::Confirmed, 50))
            .with_registration(registration("r4", "b", PaymentStatus::Pending, 40))
            .with_registration(registration("r5", "c", PaymentStatus::Pending, 30))
            .with_registration(registration("r6", "gone", PaymentStatus::Confirmed, 20))
            .with_registration(registration("r7", "c", PaymentStatus::Pending, 10));

        let manager = RegistrationManager::new(Arc::new(store));
        let summary = manager.dashboard().await.unwrap();

        assert_eq!(summary.confirmed_revenue, 50 + 50 + 30);
        assert_eq!(summary.confirmed_count, 4);
        assert_eq!(summary.pending_count, 3);
        assert_eq!(summary.live_tournaments, 1);

        let recent: Vec<&str> = summary
            .recent_registrations
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(recent, vec!["r7", "r6", "r5", "r4", "r3"]);
    }
}
