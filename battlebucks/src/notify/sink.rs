//! Notification sinks.

use super::errors::{NotifyError, NotifyResult};
use super::models::ConfirmationMessage;
use async_trait::async_trait;
use log::info;
use tokio::sync::mpsc;

/// Destination for drafted confirmation messages
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, message: ConfirmationMessage) -> NotifyResult<()>;
}

/// Writes drafts to the log. Used when no mail worker is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, message: ConfirmationMessage) -> NotifyResult<()> {
        info!(
            "Confirmation draft for {}: {} ({} bytes)",
            message.recipient,
            message.subject,
            message.body.len()
        );
        Ok(())
    }
}

/// Hands drafts to a worker over a bounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<ConfirmationMessage>,
}

impl ChannelSink {
    /// Create a sink and the receiver its worker should drain
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ConfirmationMessage>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn deliver(&self, message: ConfirmationMessage) -> NotifyResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| NotifyError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ConfirmationMessage {
        ConfirmationMessage {
            recipient: "player@example.com".to_string(),
            subject: "Registration confirmed".to_string(),
            body: "Hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_channel_sink_hands_off() {
        let (sink, mut rx) = ChannelSink::new(4);
        sink.deliver(message()).await.unwrap();
        assert_eq!(rx.recv().await, Some(message()));
    }

    #[tokio::test]
    async fn test_channel_sink_closed() {
        let (sink, rx) = ChannelSink::new(1);
        drop(rx);
        let err = sink.deliver(message()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Closed));
    }

    #[tokio::test]
    async fn test_log_sink_accepts() {
        assert!(LogSink.deliver(message()).await.is_ok());
    }
}
