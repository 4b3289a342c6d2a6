use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use super::compose::{self, Notification};
use super::dispatcher::{NotificationClient, NotificationError, NotificationEvent};
use crate::domain::{CustomerContact, Order};

/// Delivery backend: mail transport, live socket broadcast, or both.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Writes every notification to the log instead of sending it anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationError> {
        match notification {
            Notification::Email(email) => {
                info!(to = %email.to, subject = %email.subject, "Email handed off");
            }
            Notification::InventoryChanged { .. } => {
                let payload = serde_json::to_string(notification)
                    .map_err(|e| NotificationError::Delivery(e.to_string()))?;
                info!(%payload, "Inventory change broadcast");
            }
        }
        Ok(())
    }
}

/// Drains the notification queue and hands each deliverable to the [`Notifier`].
///
/// Delivery failures are logged and never reach whoever enqueued the event.
pub struct NotificationService {
    receiver: mpsc::Receiver<NotificationEvent>,
    notifier: Arc<dyn Notifier>,
    admin_email: String,
}

impl NotificationService {
    pub fn new(
        buffer_size: usize,
        notifier: Arc<dyn Notifier>,
        admin_email: impl Into<String>,
    ) -> (Self, NotificationClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            notifier,
            admin_email: admin_email.into(),
        };
        (service, NotificationClient::new(sender))
    }

    #[instrument(name = "notification_service", skip(self))]
    pub async fn run(mut self) {
        info!("NotificationService starting");

        while let Some(event) = self.receiver.recv().await {
            match event {
                NotificationEvent::OrderPlaced { order, contact } => {
                    self.handle_order_placed(&order, &contact).await;
                }
                NotificationEvent::InventoryChanged { item_id, stock } => {
                    self.deliver(Notification::InventoryChanged { item_id, stock })
                        .await;
                }
                NotificationEvent::Shutdown => {
                    info!("NotificationService shutting down");
                    break;
                }
            }
        }

        info!("NotificationService stopped");
    }

    #[instrument(fields(order_id = %order.id, customer_id = %contact.customer_id), skip(self, order, contact))]
    async fn handle_order_placed(&self, order: &Order, contact: &CustomerContact) {
        debug!("Processing order_placed event");
        for notification in compose::order_placed(order, contact, &self.admin_email) {
            self.deliver(notification).await;
        }
    }

    async fn deliver(&self, notification: Notification) {
        if let Err(e) = self.notifier.deliver(&notification).await {
            error!(error = %e, ?notification, "Notification delivery failed");
        }
    }
}
