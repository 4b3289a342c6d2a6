//! # Mock Framework
//!
//! Utilities for testing clients and the checkout engine in isolation.
//!
//! Use [`create_mock_client`] or [`create_mock_store`] to get a client and the
//! receiving end of its inbox, then script replies with the `expect_*` helpers.
//! [`spawn_store`] and [`spawn_customers`] start real actors for tests that only
//! need to observe outcomes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, FrameworkError, ResourceActor, ResourceClient, ResourceRequest};
use crate::clients::{CustomerClient, StoreClient};
use crate::domain::{Customer, CustomerContact, CustomerId, ItemId, Order, OrderId};
use crate::messages::{CommitReceipt, CommitSet, SnapshotEntry, StoreRequest};
use crate::notifications::{Notification, NotificationDispatcher, NotificationError, Notifier};
use crate::store::{StoreError, StoreService};

/// Creates a mock client and a receiver for asserting requests.
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// A store client whose requests land in the returned receiver.
pub fn create_mock_store(buffer_size: usize) -> (StoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Snapshot request
pub async fn expect_snapshot(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Vec<ItemId>, oneshot::Sender<Result<Vec<SnapshotEntry>, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Snapshot { ids, respond_to }) => Some((ids, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Commit request
pub async fn expect_commit(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(CommitSet, oneshot::Sender<Result<CommitReceipt, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Commit {
            changes,
            respond_to,
        }) => Some((changes, respond_to)),
        _ => None,
    }
}

pub fn spawn_store(notifications: Arc<dyn NotificationDispatcher>) -> StoreClient {
    let (service, client) = StoreService::new(16, notifications);
    tokio::spawn(service.run());
    client
}

pub fn spawn_customers() -> CustomerClient {
    let counter = Arc::new(AtomicU64::new(1));
    let next_id = move || CustomerId(counter.fetch_add(1, Ordering::SeqCst));
    let (actor, client) = ResourceActor::<Customer>::new(16, next_id);
    tokio::spawn(actor.run());
    CustomerClient::new(client)
}

/// Records what would have been dispatched.
#[derive(Default)]
pub struct RecordingDispatcher {
    orders: Mutex<Vec<OrderId>>,
    inventory: Mutex<Vec<(ItemId, u32)>>,
}

impl RecordingDispatcher {
    pub fn orders_placed(&self) -> Vec<OrderId> {
        self.orders.lock().unwrap().clone()
    }

    pub fn inventory_changes(&self) -> Vec<(ItemId, u32)> {
        self.inventory.lock().unwrap().clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn notify_order_placed(&self, order: &Order, _contact: &CustomerContact) -> Result<(), NotificationError> {
        self.orders.lock().unwrap().push(order.id);
        Ok(())
    }

    fn notify_inventory_changed(&self, item_id: ItemId, new_stock: u32) -> Result<(), NotificationError> {
        self.inventory.lock().unwrap().push((item_id, new_stock));
        Ok(())
    }
}

/// A dispatcher whose queue is always full.
pub struct FailingDispatcher;

impl NotificationDispatcher for FailingDispatcher {
    fn notify_order_placed(&self, _order: &Order, _contact: &CustomerContact) -> Result<(), NotificationError> {
        Err(NotificationError::QueueFull)
    }

    fn notify_inventory_changed(&self, _item_id: ItemId, _new_stock: u32) -> Result<(), NotificationError> {
        Err(NotificationError::QueueFull)
    }
}

/// Keeps every successfully delivered notification.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
    fail_emails: bool,
}

impl RecordingNotifier {
    pub fn failing_emails() -> Self {
        Self {
            fail_emails: true,
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationError> {
        if self.fail_emails && matches!(notification, Notification::Email(_)) {
            return Err(NotificationError::Delivery("smtp unreachable".into()));
        }
        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CustomerCreate;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Customer>(10);

        let create_task = tokio::spawn(async move {
            client
                .create(CustomerCreate::new("Test", "test@example.com", "0800000000"))
                .await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Test");
        responder.send(Ok(CustomerId(1))).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(CustomerId(1)));
    }
}
