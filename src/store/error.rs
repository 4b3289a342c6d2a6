use thiserror::Error;

use crate::domain::{ItemId, OrderId};

/// Errors raised by the inventory and order store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// An item read by the transaction was written by someone else before commit.
    #[error("Write conflict on {0}: it changed after it was read")]
    Conflict(ItemId),
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Stock of {item_id} would go negative: {stock} on hand, {requested} requested")]
    NegativeStock {
        item_id: ItemId,
        stock: u32,
        requested: u32,
    },
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),
    #[error("Order already exists: {0}")]
    DuplicateOrder(OrderId),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
