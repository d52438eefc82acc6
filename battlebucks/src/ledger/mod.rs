//! Registration ledger.
//!
//! The only code allowed to change a tournament's `slots_allotted`. Payment
//! confirmation and reversal each run as one store transaction that writes
//! the registration status and the slot counter together, so the counter
//! always equals the number of confirmed registrations.
//!
//! ## Example
//!
//! ```no_run
//! use battlebucks::db::MemoryStore;
//! use battlebucks::identity::CallerIdentity;
//! use battlebucks::ledger::{LedgerConfig, RegistrationLedger};
//! use battlebucks::notify::LogSink;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = RegistrationLedger::new(
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(LogSink),
//!         LedgerConfig::default(),
//!     );
//!
//!     let admin = CallerIdentity::admin("admin-1");
//!     let outcome = ledger.confirm_payment(&admin, "reg-1", Some("t-1")).await?;
//!     println!("{} of {} slots taken", outcome.slots_allotted, outcome.slots_total);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{LedgerError, LedgerResult};
pub use manager::RegistrationLedger;
pub use models::{
    DEFAULT_MAX_ATTEMPTS, LedgerConfig, MAX_REFERENCE_LEN, RevertMode, SlotMutation, SlotOp,
    SlotOutcome, SlotSnapshot, validate_reference,
};
