//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; the subscriber installed
//! here forwards those records into `tracing` so both end up in one stream.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// Log levels come from `RUST_LOG`, defaulting to
/// `info,sqlx=warn,hyper=warn`.
///
/// # Example
///
/// ```no_run
/// use bb_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Example
///
/// ```
/// use bb_server::logging::log_security_event;
///
/// log_security_event("admin_required", Some("uid-42"), "Non-admin called an admin route");
/// ```
pub fn log_security_event(event_type: &str, uid: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        uid = uid,
        "SECURITY: {}",
        message
    );
}

/// Audit record for an admin acting on a registration
pub fn log_admin_action(admin_uid: &str, action: &str, registration_id: &str, outcome: &str) {
    tracing::info!(
        admin_uid = admin_uid,
        action = action,
        registration_id = registration_id,
        outcome = outcome,
        "AUDIT: admin action"
    );
}
