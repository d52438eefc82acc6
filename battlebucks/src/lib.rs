//! # BattleBucks
//!
//! Tournament registration ledger for paid mobile-esports events (PUBG,
//! Free Fire).
//!
//! Each tournament has a fixed number of slots. Players register with a
//! pending payment; an admin confirms the payment, which consumes a slot, or
//! reverts it, which releases the slot. The tournament keeps a denormalized
//! `slots_allotted` counter that must always equal the number of confirmed
//! registrations, even when several admins confirm payments at once.
//!
//! ## Core Modules
//!
//! - [`ledger`]: Atomic payment confirmation and reversal
//! - [`db`]: Store traits with PostgreSQL and in-memory implementations
//! - [`registration`]: Registration intake, admin listings, dashboard
//! - [`tournament`]: Tournament creation and lookup
//! - [`notify`]: Confirmation message drafts and delivery sinks
//! - [`identity`]: Caller identity passed into every operation
//!
//! ## Example
//!
//! ```no_run
//! use battlebucks::{CallerIdentity, LedgerConfig, LogSink, MemoryStore, RegistrationLedger};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let ledger = RegistrationLedger::new(store, Arc::new(LogSink), LedgerConfig::default());
//!
//!     let admin = CallerIdentity::admin("admin-1");
//!     ledger.confirm_payment(&admin, "reg-1", Some("t-1")).await?;
//!     Ok(())
//! }
//! ```

/// Document store traits and implementations.
pub mod db;

/// Caller identity.
pub mod identity;

/// Payment confirmation and reversal.
pub mod ledger;

/// Confirmation notifications.
pub mod notify;

/// Registration intake, listings and dashboard.
pub mod registration;

/// Tournament management.
pub mod tournament;

pub use db::{Database, DatabaseConfig, LedgerStore, MemoryStore, PgStore, StoreError};
pub use identity::CallerIdentity;
pub use ledger::{LedgerConfig, LedgerError, RegistrationLedger, RevertMode, SlotOutcome};
pub use notify::{ChannelSink, ConfirmationMessage, LogSink, NotificationSink};
pub use registration::{
    DashboardSummary, NewRegistration, PaymentStatus, Registration, RegistrationError,
    RegistrationFilter, RegistrationManager,
};
pub use tournament::{
    Game, NewTournament, Tournament, TournamentError, TournamentManager, TournamentStatus,
};
