//! The notification seam.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::Serialize;

use crate::delivery::email::EmailError;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Email(#[from] EmailError),

    /// The sink refused the message without attempting delivery.
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Fire-and-forget delivery of a single message.
///
/// Callers treat an `Err` as a per-recipient failure to report, never as a
/// reason to undo the state change that triggered the message.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: &Notification) -> Result<(), NotifyError>;
}

/// Logs every message at `info` and reports success.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlySink;

#[async_trait::async_trait]
impl NotificationSink for LogOnlySink {
    async fn send(&self, message: &Notification) -> Result<(), NotifyError> {
        tracing::info!(to = %message.to, subject = %message.subject, "Notification (log only)");
        Ok(())
    }
}

/// Keeps every delivered message in memory and fails for chosen recipients.
///
/// Used by integration tests to observe fan-out and failure reporting.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future send to `address` fail.
    pub fn fail_for(&self, address: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(address.into());
    }

    /// Messages delivered so far, in send order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.to == address)
            .collect()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, message: &Notification) -> Result<(), NotifyError> {
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&message.to);
        if failing {
            return Err(NotifyError::Rejected(format!(
                "delivery to {} disabled",
                message.to
            )));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        Ok(())
    }
}
