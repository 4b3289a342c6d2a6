use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::domain::{CustomerId, Item, ItemId, ItemPatch, Order, OrderId, StatusUpdate};
use crate::messages::{CommitReceipt, CommitSet, SnapshotEntry, StoreRequest};
use crate::store::{StoreError, Transaction};

/// Client for the inventory and order store actor.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    /// Opens an atomic scope. Nothing is sent to the store until the first read.
    pub fn begin_transaction(&self) -> Transaction {
        Transaction::new(self.clone())
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("Sending shutdown request");
        self.sender
            .send(StoreRequest::Shutdown)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

client_method!(StoreClient => fn snapshot(ids: Vec<ItemId>) -> Vec<SnapshotEntry> as StoreRequest::Snapshot, Error = StoreError::Unavailable);
client_method!(StoreClient => fn commit(changes: CommitSet) -> CommitReceipt as StoreRequest::Commit, Error = StoreError::Unavailable);
client_method!(StoreClient => fn get_item(id: ItemId) -> Option<Item> as StoreRequest::GetItem, Error = StoreError::Unavailable);
client_method!(StoreClient => fn list_in_stock() -> Vec<Item> as StoreRequest::ListInStock, Error = StoreError::Unavailable);
client_method!(StoreClient => fn upsert_item(item: Item) -> Item as StoreRequest::UpsertItem, Error = StoreError::Unavailable);
client_method!(StoreClient => fn patch_item(id: ItemId, patch: ItemPatch) -> Item as StoreRequest::PatchItem, Error = StoreError::Unavailable);
client_method!(StoreClient => fn delete_item(id: ItemId) -> Item as StoreRequest::DeleteItem, Error = StoreError::Unavailable);
client_method!(StoreClient => fn get_order(id: OrderId) -> Option<Order> as StoreRequest::GetOrder, Error = StoreError::Unavailable);
client_method!(StoreClient => fn list_orders() -> Vec<Order> as StoreRequest::ListOrders, Error = StoreError::Unavailable);
client_method!(StoreClient => fn orders_for_customer(customer_id: CustomerId) -> Vec<Order> as StoreRequest::OrdersForCustomer, Error = StoreError::Unavailable);
client_method!(StoreClient => fn update_order_status(id: OrderId, update: StatusUpdate) -> Order as StoreRequest::UpdateOrderStatus, Error = StoreError::Unavailable);
client_method!(StoreClient => fn delete_order(id: OrderId) -> Order as StoreRequest::DeleteOrder, Error = StoreError::Unavailable);
