use tokio::sync::oneshot;

use crate::domain::{CustomerId, Item, ItemId, ItemPatch, Order, OrderId, StatusUpdate};
use crate::store::StoreError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// One item as seen at snapshot time. Absent items have version 0.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub item_id: ItemId,
    pub version: u64,
    pub item: Option<Item>,
}

/// Everything a transaction wants to persist, plus the versions it read.
///
/// The store applies a commit set in full or not at all.
#[derive(Debug, Clone, Default)]
pub struct CommitSet {
    pub reads: Vec<(ItemId, u64)>,
    pub decrements: Vec<(ItemId, u32)>,
    pub orders: Vec<Order>,
}

/// Stock of every decremented item right after the commit, in first-touch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    pub stock_levels: Vec<(ItemId, u32)>,
}

/// Typed messages for the store actor. Each variant includes parameters
/// and a oneshot channel for responses.
#[derive(Debug)]
pub enum StoreRequest {
    Snapshot {
        ids: Vec<ItemId>,
        respond_to: ServiceResponse<Vec<SnapshotEntry>, StoreError>,
    },
    Commit {
        changes: CommitSet,
        respond_to: ServiceResponse<CommitReceipt, StoreError>,
    },
    GetItem {
        id: ItemId,
        respond_to: ServiceResponse<Option<Item>, StoreError>,
    },
    ListInStock {
        respond_to: ServiceResponse<Vec<Item>, StoreError>,
    },
    UpsertItem {
        item: Item,
        respond_to: ServiceResponse<Item, StoreError>,
    },
    PatchItem {
        id: ItemId,
        patch: ItemPatch,
        respond_to: ServiceResponse<Item, StoreError>,
    },
    DeleteItem {
        id: ItemId,
        respond_to: ServiceResponse<Item, StoreError>,
    },
    GetOrder {
        id: OrderId,
        respond_to: ServiceResponse<Option<Order>, StoreError>,
    },
    ListOrders {
        respond_to: ServiceResponse<Vec<Order>, StoreError>,
    },
    OrdersForCustomer {
        customer_id: CustomerId,
        respond_to: ServiceResponse<Vec<Order>, StoreError>,
    },
    UpdateOrderStatus {
        id: OrderId,
        update: StatusUpdate,
        respond_to: ServiceResponse<Order, StoreError>,
    },
    DeleteOrder {
        id: OrderId,
        respond_to: ServiceResponse<Order, StoreError>,
    },
    Shutdown,
}
