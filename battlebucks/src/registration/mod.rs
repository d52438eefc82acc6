//! Player registrations: intake, admin listings and the dashboard summary.
//!
//! Registrations are created `Pending` and never touch the tournament's slot
//! counter; only the [`ledger`](crate::ledger) moves them between payment
//! states.

pub mod errors;
pub mod manager;
pub mod models;
pub mod query;

pub use errors::{RegistrationError, RegistrationResult};
pub use manager::{RECENT_REGISTRATIONS, RegistrationManager};
pub use models::{
    DashboardSummary, NewRegistration, PaymentStatus, Registration, RegistrationId,
};
pub use query::RegistrationFilter;
