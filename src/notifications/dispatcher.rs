use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, instrument};

use crate::domain::{CustomerContact, ItemId, Order};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Notification queue is full")]
    QueueFull,
    #[error("Notification service has stopped")]
    QueueClosed,
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Post-commit side channel consumed by the checkout engine and the store.
///
/// Both calls only enqueue and must never block on delivery. An `Err` means the
/// notification was dropped; callers log it and carry on.
pub trait NotificationDispatcher: Send + Sync {
    fn notify_order_placed(
        &self,
        order: &Order,
        contact: &CustomerContact,
    ) -> Result<(), NotificationError>;

    fn notify_inventory_changed(&self, item_id: ItemId, new_stock: u32) -> Result<(), NotificationError>;
}

#[derive(Debug)]
pub enum NotificationEvent {
    OrderPlaced {
        order: Box<Order>,
        contact: CustomerContact,
    },
    InventoryChanged {
        item_id: ItemId,
        stock: u32,
    },
    Shutdown,
}

/// Handle onto the bounded notification queue.
#[derive(Clone)]
pub struct NotificationClient {
    sender: mpsc::Sender<NotificationEvent>,
}

impl NotificationClient {
    pub fn new(sender: mpsc::Sender<NotificationEvent>) -> Self {
        Self { sender }
    }

    fn enqueue(&self, event: NotificationEvent) -> Result<(), NotificationError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => NotificationError::QueueFull,
            TrySendError::Closed(_) => NotificationError::QueueClosed,
        })
    }

    /// Queued behind any pending notifications, which are still delivered.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), NotificationError> {
        debug!("Sending shutdown request");
        self.sender
            .send(NotificationEvent::Shutdown)
            .await
            .map_err(|_| NotificationError::QueueClosed)
    }
}

impl NotificationDispatcher for NotificationClient {
    #[instrument(fields(order_id = %order.id), skip(self, order, contact))]
    fn notify_order_placed(
        &self,
        order: &Order,
        contact: &CustomerContact,
    ) -> Result<(), NotificationError> {
        debug!("Enqueuing order notification");
        self.enqueue(NotificationEvent::OrderPlaced {
            order: Box::new(order.clone()),
            contact: contact.clone(),
        })
    }

    #[instrument(skip(self))]
    fn notify_inventory_changed(&self, item_id: ItemId, new_stock: u32) -> Result<(), NotificationError> {
        debug!("Enqueuing inventory notification");
        self.enqueue(NotificationEvent::InventoryChanged {
            item_id,
            stock: new_stock,
        })
    }
}
