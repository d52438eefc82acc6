//! Tournaments: the capacity-bearing events registrations consume.
//!
//! ## Example
//!
//! ```no_run
//! use battlebucks::db::MemoryStore;
//! use battlebucks::tournament::{Game, NewTournament, TournamentManager};
//! use chrono::{NaiveDate, NaiveTime};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(Arc::new(MemoryStore::new()));
//!
//!     let tournament = manager
//!         .create_tournament(NewTournament {
//!             title: "Bermuda Clash".to_string(),
//!             game: Game::FreeFire,
//!             date: NaiveDate::from_ymd_opt(2026, 12, 5).unwrap(),
//!             time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
//!             entry_fee: 30,
//!             prize_pool: 1500,
//!             slots_total: 48,
//!             rules: vec![],
//!         })
//!         .await?;
//!     println!("Created tournament: {}", tournament.id);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{Game, NewTournament, Tournament, TournamentId, TournamentStatus};
