//! Payment confirmation notifications.
//!
//! After a payment is confirmed the ledger drafts a [`ConfirmationMessage`]
//! and hands it to a [`NotificationSink`] on a detached task. Delivery is
//! best-effort: errors are logged by the caller and never reach the admin
//! who confirmed the payment.

pub mod errors;
pub mod models;
pub mod sink;

pub use errors::{NotifyError, NotifyResult};
pub use models::ConfirmationMessage;
pub use sink::{ChannelSink, LogSink, NotificationSink};
