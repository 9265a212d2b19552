//! Notification channel that writes to the log and keeps an outbox.
//!
//! Stands in for the concierge desk's paging system. Every notification is
//! emitted as a structured tracing event and retained for inspection.

use async_trait::async_trait;
use concierge_core::{Notification, NotificationChannel, NotificationReceipt, NotificationUrgency};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub const DESK_CHANNEL: &str = "concierge_desk";

#[derive(Default)]
pub struct LogNotifier {
    outbox: Arc<RwLock<Vec<Notification>>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first.
    pub async fn delivered(&self) -> Vec<Notification> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl NotificationChannel for LogNotifier {
    async fn notify(&self, notification: &Notification) -> NotificationReceipt {
        match notification.urgency {
            NotificationUrgency::Critical => warn!(
                member_id = %notification.member.member_id,
                category = %notification.category,
                "CRITICAL concierge alert: {}",
                notification.message
            ),
            NotificationUrgency::High => info!(
                member_id = %notification.member.member_id,
                category = %notification.category,
                "Concierge alert: {}",
                notification.message
            ),
        }
        self.outbox.write().await.push(notification.clone());
        NotificationReceipt {
            sent: true,
            channels_attempted: vec![DESK_CHANNEL.into()],
        }
    }
}
