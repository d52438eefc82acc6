//! Admin listing filters for registrations.

use super::models::{PaymentStatus, Registration};
use serde::{Deserialize, Serialize};

/// Filter applied to registration listings.
///
/// All set criteria must match. `search` is a case-insensitive substring
/// match against the email, game ID and UPI ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFilter {
    pub status: Option<PaymentStatus>,
    pub tournament_id: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl RegistrationFilter {
    /// Filter matching every registration
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_tournament(mut self, tournament_id: impl Into<String>) -> Self {
        self.tournament_id = Some(tournament_id.into());
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Normalized search term, `None` when blank
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Check a registration against the filter (limit is not applied here)
    pub fn matches(&self, registration: &Registration) -> bool {
        if let Some(status) = self.status
            && registration.payment_status != status
        {
            return false;
        }

        if let Some(tournament_id) = self.tournament_id.as_deref()
            && registration.tournament_id.as_deref() != Some(tournament_id)
        {
            return false;
        }

        match self.search_term() {
            Some(term) => [
                &registration.user_email,
                &registration.game_id,
                &registration.upi_id,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term)),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn registration(email: &str, status: PaymentStatus, tournament: Option<&str>) -> Registration {
        Registration {
            id: "r1".to_string(),
            tournament_id: tournament.map(str::to_string),
            tournament_title: "The Grand Clash".to_string(),
            user_id: "u1".to_string(),
            user_email: email.to_string(),
            game_id: "5123498765".to_string(),
            team_name: "Night Owls".to_string(),
            upi_id: "owl@okaxis".to_string(),
            payment_status: status,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let reg = registration("a@b.com", PaymentStatus::Pending, None);
        assert!(RegistrationFilter::all().matches(&reg));
    }

    #[test]
    fn test_status_filter() {
        let reg = registration("a@b.com", PaymentStatus::Pending, Some("t1"));
        assert!(RegistrationFilter::all().with_status(PaymentStatus::Pending).matches(&reg));
        assert!(!RegistrationFilter::all().with_status(PaymentStatus::Confirmed).matches(&reg));
    }

    #[test]
    fn test_tournament_filter_skips_unreferenced_registrations() {
        let reg = registration("a@b.com", PaymentStatus::Pending, None);
        assert!(!RegistrationFilter::all().with_tournament("t1").matches(&reg));
    }

    #[test]
    fn test_search_is_case_insensitive_over_email_game_and_upi() {
        let reg = registration("Sniper.Queen@Mail.com", PaymentStatus::Confirmed, Some("t1"));
        assert!(RegistrationFilter::all().with_search("sniper").matches(&reg));
        assert!(RegistrationFilter::all().with_search("51234").matches(&reg));
        assert!(RegistrationFilter::all().with_search("OKAXIS").matches(&reg));
        // Team name is not searchable
        assert!(!RegistrationFilter::all().with_search("night owls").matches(&reg));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let reg = registration("a@b.com", PaymentStatus::Pending, None);
        assert!(RegistrationFilter::all().with_search("   ").matches(&reg));
    }
}
