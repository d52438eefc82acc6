//! Tournament data models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tournament document ID
pub type TournamentId = String;

/// Game a tournament is played in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Game {
    #[serde(rename = "PUBG")]
    Pubg,
    #[serde(rename = "Free Fire")]
    FreeFire,
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Game::Pubg => write!(f, "PUBG"),
            Game::FreeFire => write!(f, "Free Fire"),
        }
    }
}

impl FromStr for Game {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBG" => Ok(Game::Pubg),
            "Free Fire" => Ok(Game::FreeFire),
            other => Err(format!("unknown game '{other}'")),
        }
    }
}

/// Tournament lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    /// Open for registration
    Upcoming,
    /// Match in progress
    Ongoing,
    /// Match finished, registrations closed
    Completed,
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentStatus::Upcoming => write!(f, "Upcoming"),
            TournamentStatus::Ongoing => write!(f, "Ongoing"),
            TournamentStatus::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Upcoming" => Ok(TournamentStatus::Upcoming),
            "Ongoing" => Ok(TournamentStatus::Ongoing),
            "Completed" => Ok(TournamentStatus::Completed),
            other => Err(format!("unknown tournament status '{other}'")),
        }
    }
}

/// Tournament document
///
/// `slots_allotted` is owned by the registration ledger; every other
/// descriptive field is owned by the admin screens. `version` is bumped by
/// the store on every committed write and backs optimistic concurrency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub title: String,
    pub game: Game,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Entry fee in whole rupees
    pub entry_fee: i64,
    pub prize_pool: i64,
    pub slots_total: i64,
    pub slots_allotted: i64,
    pub status: TournamentStatus,
    pub rules: Vec<String>,
    #[serde(default)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Number of slots still free for confirmation
    pub fn slots_left(&self) -> i64 {
        (self.slots_total - self.slots_allotted).max(0)
    }
}

/// Request to create a tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTournament {
    pub title: String,
    pub game: Game,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub entry_fee: i64,
    pub prize_pool: i64,
    pub slots_total: i64,
    #[serde(default)]
    pub rules: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(total: i64, allotted: i64) -> Tournament {
        Tournament {
            id: "t1".to_string(),
            title: "Weekend Warriors Cup".to_string(),
            game: Game::Pubg,
            date: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            entry_fee: 50,
            prize_pool: 5000,
            slots_total: total,
            slots_allotted: allotted,
            status: TournamentStatus::Upcoming,
            rules: vec![],
            version: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_slots_left() {
        assert_eq!(sample(10, 9).slots_left(), 1);
        assert_eq!(sample(10, 10).slots_left(), 0);
        // Legacy data with a negative counter still reports a sane value
        assert_eq!(sample(10, 12).slots_left(), 0);
    }

    #[test]
    fn test_game_serde_names() {
        assert_eq!(serde_json::to_string(&Game::FreeFire).unwrap(), "\"Free Fire\"");
        assert_eq!("PUBG".parse::<Game>().unwrap(), Game::Pubg);
        assert!("Valorant".parse::<Game>().is_err());
    }

    #[test]
    fn test_status_parse_is_case_sensitive() {
        assert_eq!(
            "Completed".parse::<TournamentStatus>().unwrap(),
            TournamentStatus::Completed
        );
        assert!("completed".parse::<TournamentStatus>().is_err());
    }
}
