//! Notification sinks for submission toasts.

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::types::notification::Notification;

/// Receives success and error notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to a tokio channel, e.g. the RPC host's event loop.
pub struct ChannelNotificationSink {
    tx: UnboundedSender<Notification>,
}

impl ChannelNotificationSink {
    pub fn new(tx: UnboundedSender<Notification>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelNotificationSink {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("notification receiver dropped");
        }
    }
}
