use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use super::StoreError;
use crate::clients::StoreClient;
use crate::domain::{CustomerId, Item, ItemId, ItemPatch, Order, OrderId, StatusUpdate};
use crate::messages::{CommitReceipt, CommitSet, ServiceResponse, SnapshotEntry, StoreRequest};
use crate::notifications::NotificationDispatcher;

struct StoredItem {
    item: Item,
    /// Bumped on every write, deletion included. Starts at 1; a never-stored item reads as 0.
    version: u64,
}

/// Inventory and order store actor.
///
/// Every message is handled to completion before the next one is received, so a
/// [`StoreRequest::Commit`] is applied as one indivisible step. Isolation between
/// concurrent transactions is optimistic: a commit is refused with
/// [`StoreError::Conflict`] when any item it read has been written since.
/// Every stock change, committed or edited, is announced from here.
pub struct StoreService {
    receiver: mpsc::Receiver<StoreRequest>,
    items: HashMap<ItemId, StoredItem>,
    /// Last version of each deleted item, so a re-read never sees 0 again.
    tombstones: HashMap<ItemId, u64>,
    orders: HashMap<OrderId, Order>,
    order_log: Vec<OrderId>,
    orders_by_customer: HashMap<CustomerId, Vec<OrderId>>,
    notifications: Arc<dyn NotificationDispatcher>,
}

impl StoreService {
    pub fn new(
        buffer_size: usize,
        notifications: Arc<dyn NotificationDispatcher>,
    ) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            items: HashMap::new(),
            tombstones: HashMap::new(),
            orders: HashMap::new(),
            order_log: Vec::new(),
            orders_by_customer: HashMap::new(),
            notifications,
        };
        (service, StoreClient::new(sender))
    }

    #[instrument(name = "store_service", skip(self))]
    pub async fn run(mut self) {
        info!("StoreService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Snapshot { ids, respond_to } => {
                    self.handle_snapshot(ids, respond_to);
                }
                StoreRequest::Commit {
                    changes,
                    respond_to,
                } => {
                    self.handle_commit(changes, respond_to);
                }
                StoreRequest::GetItem { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.items.get(&id).map(|s| s.item.clone())));
                }
                StoreRequest::ListInStock { respond_to } => {
                    self.handle_list_in_stock(respond_to);
                }
                StoreRequest::UpsertItem { item, respond_to } => {
                    self.handle_upsert_item(item, respond_to);
                }
                StoreRequest::PatchItem {
                    id,
                    patch,
                    respond_to,
                } => {
                    self.handle_patch_item(id, patch, respond_to);
                }
                StoreRequest::DeleteItem { id, respond_to } => {
                    self.handle_delete_item(id, respond_to);
                }
                StoreRequest::GetOrder { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.orders.get(&id).cloned()));
                }
                StoreRequest::ListOrders { respond_to } => {
                    let orders = self.collect_orders(&self.order_log);
                    let _ = respond_to.send(Ok(orders));
                }
                StoreRequest::OrdersForCustomer {
                    customer_id,
                    respond_to,
                } => {
                    self.handle_orders_for_customer(customer_id, respond_to);
                }
                StoreRequest::UpdateOrderStatus {
                    id,
                    update,
                    respond_to,
                } => {
                    self.handle_update_order_status(id, update, respond_to);
                }
                StoreRequest::DeleteOrder { id, respond_to } => {
                    self.handle_delete_order(id, respond_to);
                }
                StoreRequest::Shutdown => {
                    info!("StoreService shutting down");
                    break;
                }
            }
        }

        info!("StoreService stopped");
    }

    fn version_of(&self, id: &ItemId) -> u64 {
        match self.items.get(id) {
            Some(stored) => stored.version,
            None => self.tombstones.get(id).copied().unwrap_or(0),
        }
    }

    #[instrument(fields(items = ids.len()), skip(self, ids, respond_to))]
    fn handle_snapshot(
        &self,
        ids: Vec<ItemId>,
        respond_to: ServiceResponse<Vec<SnapshotEntry>, StoreError>,
    ) {
        debug!("Processing snapshot request");

        let entries = ids
            .into_iter()
            .map(|item_id| SnapshotEntry {
                item_id,
                version: self.version_of(&item_id),
                item: self.items.get(&item_id).map(|stored| stored.item.clone()),
            })
            .collect();

        let _ = respond_to.send(Ok(entries));
    }

    #[instrument(
        fields(
            reads = changes.reads.len(),
            decrements = changes.decrements.len(),
            orders = changes.orders.len()
        ),
        skip(self, changes, respond_to)
    )]
    fn handle_commit(
        &mut self,
        changes: CommitSet,
        respond_to: ServiceResponse<CommitReceipt, StoreError>,
    ) {
        debug!("Processing commit request");

        let result = self.apply_commit(changes);
        match &result {
            Ok(receipt) => {
                info!(items = receipt.stock_levels.len(), "Commit applied");
                for &(item_id, stock) in &receipt.stock_levels {
                    self.announce_stock(item_id, stock);
                }
            }
            Err(StoreError::Conflict(item_id)) => warn!(%item_id, "Commit refused: write conflict"),
            Err(e) => error!(error = %e, "Commit refused"),
        }

        let _ = respond_to.send(result);
    }

    /// Checks everything first and only then writes, so a refused commit leaves no trace.
    fn apply_commit(&mut self, changes: CommitSet) -> Result<CommitReceipt, StoreError> {
        for (item_id, seen) in &changes.reads {
            if self.version_of(item_id) != *seen {
                return Err(StoreError::Conflict(*item_id));
            }
        }

        let mut staged: HashMap<ItemId, Item> = HashMap::new();
        let mut touched: Vec<ItemId> = Vec::new();
        for &(item_id, requested) in &changes.decrements {
            let item = match staged.entry(item_id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let stored = self
                        .items
                        .get(&item_id)
                        .ok_or(StoreError::ItemNotFound(item_id))?;
                    touched.push(item_id);
                    entry.insert(stored.item.clone())
                }
            };
            let stock = item.stock;
            item.stock = stock
                .checked_sub(requested)
                .ok_or(StoreError::NegativeStock {
                    item_id,
                    stock,
                    requested,
                })?;
        }

        for order in &changes.orders {
            if self.orders.contains_key(&order.id) {
                return Err(StoreError::DuplicateOrder(order.id));
            }
        }

        let mut receipt = CommitReceipt::default();
        for item_id in touched {
            if let (Some(item), Some(stored)) = (staged.remove(&item_id), self.items.get_mut(&item_id)) {
                receipt.stock_levels.push((item_id, item.stock));
                stored.item = item;
                stored.version += 1;
            }
        }

        for order in changes.orders {
            self.order_log.push(order.id);
            self.orders_by_customer
                .entry(order.customer_id)
                .or_default()
                .push(order.id);
            self.orders.insert(order.id, order);
        }

        Ok(receipt)
    }

    #[instrument(skip(self, respond_to))]
    fn handle_list_in_stock(&self, respond_to: ServiceResponse<Vec<Item>, StoreError>) {
        debug!("Processing list_in_stock request");

        let mut items: Vec<Item> = self
            .items
            .values()
            .filter(|stored| stored.item.stock > 0)
            .map(|stored| stored.item.clone())
            .collect();
        items.sort_by_key(|item| item.id);
        info!(item_count = items.len(), "Listed in-stock items");

        let _ = respond_to.send(Ok(items));
    }

    #[instrument(fields(item_id = %item.id, price = item.price, stock = item.stock), skip(self, item, respond_to))]
    fn handle_upsert_item(&mut self, item: Item, respond_to: ServiceResponse<Item, StoreError>) {
        debug!("Processing upsert_item request");

        let version = self.version_of(&item.id) + 1;
        self.tombstones.remove(&item.id);
        self.items.insert(
            item.id,
            StoredItem {
                item: item.clone(),
                version,
            },
        );
        info!(version, "Item stored");

        self.announce(&item);
        let _ = respond_to.send(Ok(item));
    }

    #[instrument(fields(item_id = %id), skip(self, respond_to))]
    fn handle_patch_item(
        &mut self,
        id: ItemId,
        patch: ItemPatch,
        respond_to: ServiceResponse<Item, StoreError>,
    ) {
        debug!("Processing patch_item request");

        let result = match self.items.get_mut(&id) {
            Some(stored) => {
                patch.apply(&mut stored.item);
                stored.version += 1;
                info!(version = stored.version, price = stored.item.price, stock = stored.item.stock, "Item updated");
                Ok(stored.item.clone())
            }
            None => {
                error!("Item not found for update");
                Err(StoreError::ItemNotFound(id))
            }
        };

        if let Ok(item) = &result {
            self.announce(item);
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(item_id = %id), skip(self, respond_to))]
    fn handle_delete_item(&mut self, id: ItemId, respond_to: ServiceResponse<Item, StoreError>) {
        debug!("Processing delete_item request");

        let result = match self.items.remove(&id) {
            Some(stored) => {
                let version = stored.version + 1;
                self.tombstones.insert(id, version);
                info!(version, "Item deleted");
                self.announce_stock(id, 0);
                Ok(stored.item)
            }
            None => {
                error!("Item not found for delete");
                Err(StoreError::ItemNotFound(id))
            }
        };

        let _ = respond_to.send(result);
    }

    #[instrument(fields(customer_id = %customer_id), skip(self, respond_to))]
    fn handle_orders_for_customer(
        &self,
        customer_id: CustomerId,
        respond_to: ServiceResponse<Vec<Order>, StoreError>,
    ) {
        debug!("Processing orders_for_customer request");

        let orders = self
            .orders_by_customer
            .get(&customer_id)
            .map(|ids| self.collect_orders(ids))
            .unwrap_or_default();
        info!(order_count = orders.len(), "Listed customer orders");

        let _ = respond_to.send(Ok(orders));
    }

    #[instrument(fields(order_id = %id), skip(self, respond_to))]
    fn handle_update_order_status(
        &mut self,
        id: OrderId,
        update: StatusUpdate,
        respond_to: ServiceResponse<Order, StoreError>,
    ) {
        debug!("Processing update_order_status request");

        let result = match self.orders.get_mut(&id) {
            Some(order) => {
                update.apply(order);
                info!(
                    payment_status = %order.payment_status,
                    order_status = %order.order_status,
                    "Order status updated"
                );
                Ok(order.clone())
            }
            None => {
                error!("Order not found for status update");
                Err(StoreError::OrderNotFound(id))
            }
        };

        let _ = respond_to.send(result);
    }

    /// Admin removal. Stock the order consumed is not returned to inventory.
    #[instrument(fields(order_id = %id), skip(self, respond_to))]
    fn handle_delete_order(&mut self, id: OrderId, respond_to: ServiceResponse<Order, StoreError>) {
        debug!("Processing delete_order request");

        let result = match self.orders.remove(&id) {
            Some(order) => {
                self.order_log.retain(|logged| *logged != id);
                if let Some(history) = self.orders_by_customer.get_mut(&order.customer_id) {
                    history.retain(|logged| *logged != id);
                }
                info!(customer_id = %order.customer_id, "Order deleted");
                Ok(order)
            }
            None => {
                error!("Order not found for delete");
                Err(StoreError::OrderNotFound(id))
            }
        };

        let _ = respond_to.send(result);
    }

    fn collect_orders(&self, ids: &[OrderId]) -> Vec<Order> {
        ids.iter().filter_map(|id| self.orders.get(id).cloned()).collect()
    }

    /// Admin edits are broadcast like any other stock change.
    fn announce(&self, item: &Item) {
        self.announce_stock(item.id, item.stock);
    }

    fn announce_stock(&self, item_id: ItemId, stock: u32) {
        if let Err(e) = self.notifications.notify_inventory_changed(item_id, stock) {
            warn!(%item_id, error = %e, "Inventory change notification dropped");
        }
    }
}
