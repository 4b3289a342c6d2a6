use std::collections::HashMap;
use tracing::{debug, instrument};

use super::StoreError;
use crate::clients::StoreClient;
use crate::domain::{Item, ItemId, Order};
use crate::messages::{CommitReceipt, CommitSet};
use crate::validator::InventoryView;

/// An atomic scope over the inventory and order store.
///
/// Reads are served from a snapshot taken when an item is first loaded. Writes are
/// buffered locally and reach the store only through [`Transaction::commit`], which
/// the store refuses if anything read here has changed since. Dropping a transaction
/// without committing discards every buffered write.
pub struct Transaction {
    store: StoreClient,
    reads: HashMap<ItemId, u64>,
    working: HashMap<ItemId, Option<Item>>,
    decrements: Vec<(ItemId, u32)>,
    orders: Vec<Order>,
}

impl Transaction {
    pub(crate) fn new(store: StoreClient) -> Self {
        Self {
            store,
            reads: HashMap::new(),
            working: HashMap::new(),
            decrements: Vec::new(),
            orders: Vec::new(),
        }
    }

    /// Loads every not-yet-read item in one snapshot request, so items loaded
    /// together are seen at the same point in time.
    #[instrument(skip_all)]
    pub async fn load<I>(&mut self, ids: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = ItemId>,
    {
        let mut missing: Vec<ItemId> = ids
            .into_iter()
            .filter(|id| !self.reads.contains_key(id))
            .collect();
        missing.sort();
        missing.dedup();
        if missing.is_empty() {
            return Ok(());
        }

        debug!(items = missing.len(), "Loading snapshot");
        for entry in self.store.snapshot(missing).await? {
            self.reads.insert(entry.item_id, entry.version);
            self.working.insert(entry.item_id, entry.item);
        }
        Ok(())
    }

    /// The item as this scope sees it, including its own uncommitted decrements.
    pub async fn get_item(&mut self, id: ItemId) -> Result<Option<Item>, StoreError> {
        self.load([id]).await?;
        Ok(self.working.get(&id).cloned().flatten())
    }

    /// Buffers a decrement and returns the stock this scope now sees.
    ///
    /// Refuses rather than clamps when the stock would go negative.
    pub async fn decrement_stock(&mut self, id: ItemId, quantity: u32) -> Result<u32, StoreError> {
        self.load([id]).await?;

        let item = self
            .working
            .get_mut(&id)
            .and_then(Option::as_mut)
            .ok_or(StoreError::ItemNotFound(id))?;
        let remaining = item
            .stock
            .checked_sub(quantity)
            .ok_or(StoreError::NegativeStock {
                item_id: id,
                stock: item.stock,
                requested: quantity,
            })?;
        item.stock = remaining;

        self.decrements.push((id, quantity));
        Ok(remaining)
    }

    pub fn create_order(&mut self, order: Order) {
        self.orders.push(order);
    }

    /// Persists all buffered writes together, or none of them.
    #[instrument(skip_all, fields(decrements = self.decrements.len(), orders = self.orders.len()))]
    pub async fn commit(self) -> Result<CommitReceipt, StoreError> {
        let changes = CommitSet {
            reads: self.reads.into_iter().collect(),
            decrements: self.decrements,
            orders: self.orders,
        };
        self.store.commit(changes).await
    }

    pub fn abort(self) {
        debug!(
            discarded_decrements = self.decrements.len(),
            discarded_orders = self.orders.len(),
            "Transaction aborted"
        );
    }
}

impl InventoryView for Transaction {
    fn item(&self, id: &ItemId) -> Option<&Item> {
        self.working.get(id).and_then(Option::as_ref)
    }
}
