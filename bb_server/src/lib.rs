//! HTTP server for the BattleBucks registration ledger.
//!
//! Exposes tournaments and registrations over a JSON API, with admin
//! routes for confirming payments against tournament capacity.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
