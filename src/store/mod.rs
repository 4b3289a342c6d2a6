//! Inventory and order store: one actor owning both, so a checkout's stock
//! decrements and its order are persisted by a single atomic commit.

pub mod error;
pub mod service;
pub mod transaction;

pub use error::*;
pub use service::*;
pub use transaction::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::StoreClient;
    use crate::domain::{
        ContactInfo, CustomerId, Item, ItemId, ItemPatch, Order, OrderLine, OrderStatus,
        PaymentStatus, StatusUpdate,
    };
    use crate::mock_framework::{spawn_store, RecordingDispatcher};
    use std::sync::Arc;

    fn order_for(customer: u64, item: &Item, quantity: u32) -> Order {
        let line = OrderLine {
            item_id: item.id,
            name: item.name.clone(),
            quantity,
            unit_price: item.price,
        };
        Order::place(
            CustomerId(customer),
            vec![line],
            &ContactInfo::new("ada@example.com", "0800000000", "cash"),
        )
        .unwrap()
    }

    async fn seeded(stock: u32) -> (StoreClient, Arc<RecordingDispatcher>, Item) {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let store = spawn_store(dispatcher.clone());
        let item = store
            .upsert_item(Item::new(1, "Jollof Rice", 100, stock))
            .await
            .unwrap();
        (store, dispatcher, item)
    }

    #[tokio::test]
    async fn test_commit_applies_decrements_and_order_together() {
        let (store, _, item) = seeded(5).await;

        let mut tx = store.begin_transaction();
        tx.load([item.id]).await.unwrap();
        assert_eq!(tx.decrement_stock(item.id, 3).await.unwrap(), 2);
        let order = order_for(1, &item, 3);
        tx.create_order(order.clone());
        let receipt = tx.commit().await.unwrap();

        assert_eq!(receipt.stock_levels, vec![(item.id, 2)]);
        assert_eq!(store.get_item(item.id).await.unwrap().unwrap().stock, 2);
        assert_eq!(store.get_order(order.id).await.unwrap(), Some(order.clone()));
        assert_eq!(store.orders_for_customer(CustomerId(1)).await.unwrap(), vec![order]);
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible_and_abort_discards_them() {
        let (store, _, item) = seeded(5).await;

        let mut tx = store.begin_transaction();
        tx.decrement_stock(item.id, 4).await.unwrap();
        tx.create_order(order_for(1, &item, 4));

        assert_eq!(store.get_item(item.id).await.unwrap().unwrap().stock, 5);
        tx.abort();

        assert_eq!(store.get_item(item.id).await.unwrap().unwrap().stock, 5);
        assert!(store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_writer_forces_conflict() {
        let (store, _, item) = seeded(5).await;

        let mut first = store.begin_transaction();
        let mut second = store.begin_transaction();
        first.decrement_stock(item.id, 5).await.unwrap();
        second.decrement_stock(item.id, 5).await.unwrap();

        first.commit().await.unwrap();
        let refused = second.commit().await;

        assert_eq!(refused, Err(StoreError::Conflict(item.id)));
        assert_eq!(store.get_item(item.id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_admin_edit_invalidates_open_transaction() {
        let (store, _, item) = seeded(5).await;

        let mut tx = store.begin_transaction();
        tx.decrement_stock(item.id, 1).await.unwrap();
        store.patch_item(item.id, ItemPatch::price(120)).await.unwrap();

        assert_eq!(tx.commit().await, Err(StoreError::Conflict(item.id)));
        assert_eq!(store.get_item(item.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_decrement_past_zero_is_refused_not_clamped() {
        let (store, _, item) = seeded(2).await;

        let mut tx = store.begin_transaction();
        let refused = tx.decrement_stock(item.id, 3).await;
        assert_eq!(
            refused,
            Err(StoreError::NegativeStock {
                item_id: item.id,
                stock: 2,
                requested: 3,
            })
        );
    }

    #[tokio::test]
    async fn test_store_rechecks_stock_on_commit() {
        let (store, _, item) = seeded(2).await;

        // A hand-built commit set bypassing the transaction's own check.
        let changes = crate::messages::CommitSet {
            reads: vec![(item.id, 1)],
            decrements: vec![(item.id, 2), (item.id, 1)],
            orders: vec![order_for(1, &item, 3)],
        };
        let refused = store.commit(changes).await;

        assert!(matches!(refused, Err(StoreError::NegativeStock { .. })));
        assert_eq!(store.get_item(item.id).await.unwrap().unwrap().stock, 2);
        assert!(store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reading_a_missing_item_then_creating_it_conflicts() {
        let (store, _, _) = seeded(1).await;

        let mut tx = store.begin_transaction();
        assert_eq!(tx.get_item(ItemId(9)).await.unwrap(), None);
        store.upsert_item(Item::new(9, "Chin Chin", 30, 10)).await.unwrap();

        assert_eq!(tx.commit().await, Err(StoreError::Conflict(ItemId(9))));
    }

    #[tokio::test]
    async fn test_admin_edits_are_announced() {
        let (store, dispatcher, item) = seeded(5).await;
        store.patch_item(item.id, ItemPatch::stock(8)).await.unwrap();

        assert_eq!(dispatcher.inventory_changes(), vec![(item.id, 5), (item.id, 8)]);
    }

    #[tokio::test]
    async fn test_commit_announces_new_stock() {
        let (store, dispatcher, item) = seeded(5).await;

        let mut tx = store.begin_transaction();
        tx.decrement_stock(item.id, 2).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(dispatcher.inventory_changes(), vec![(item.id, 5), (item.id, 3)]);
    }

    #[tokio::test]
    async fn test_delete_item_is_announced_as_sold_out() {
        let (store, dispatcher, item) = seeded(5).await;

        let deleted = store.delete_item(item.id).await.unwrap();

        assert_eq!(deleted, item);
        assert_eq!(store.get_item(item.id).await.unwrap(), None);
        assert_eq!(dispatcher.inventory_changes(), vec![(item.id, 5), (item.id, 0)]);
        assert_eq!(store.delete_item(item.id).await, Err(StoreError::ItemNotFound(item.id)));
    }

    #[tokio::test]
    async fn test_insert_then_delete_still_conflicts_with_earlier_read() {
        let (store, _, _) = seeded(1).await;

        let mut tx = store.begin_transaction();
        assert_eq!(tx.get_item(ItemId(9)).await.unwrap(), None);
        store.upsert_item(Item::new(9, "Chin Chin", 30, 10)).await.unwrap();
        store.delete_item(ItemId(9)).await.unwrap();

        assert_eq!(tx.commit().await, Err(StoreError::Conflict(ItemId(9))));

        let entries = store.snapshot(vec![ItemId(9)]).await.unwrap();
        assert_eq!(entries[0].version, 2);
        assert_eq!(entries[0].item, None);
    }

    #[tokio::test]
    async fn test_recreated_item_continues_its_version() {
        let (store, _, item) = seeded(5).await;
        store.delete_item(item.id).await.unwrap();
        store.upsert_item(Item::new(1, "Jollof Rice", 110, 3)).await.unwrap();

        let entries = store.snapshot(vec![item.id]).await.unwrap();
        assert_eq!(entries[0].version, 3);
        assert_eq!(entries[0].item.as_ref().map(|i| i.stock), Some(3));
    }

    #[tokio::test]
    async fn test_delete_order_removes_it_from_every_listing() {
        let (store, _, item) = seeded(5).await;
        let kept = order_for(1, &item, 1);
        let removed = order_for(1, &item, 2);
        let mut tx = store.begin_transaction();
        tx.decrement_stock(item.id, 3).await.unwrap();
        tx.create_order(kept.clone());
        tx.create_order(removed.clone());
        tx.commit().await.unwrap();

        assert_eq!(store.delete_order(removed.id).await.unwrap(), removed);

        assert_eq!(store.get_order(removed.id).await.unwrap(), None);
        assert_eq!(store.list_orders().await.unwrap(), vec![kept.clone()]);
        assert_eq!(store.orders_for_customer(CustomerId(1)).await.unwrap(), vec![kept]);
        assert_eq!(store.get_item(item.id).await.unwrap().unwrap().stock, 2);
        assert_eq!(
            store.delete_order(removed.id).await,
            Err(StoreError::OrderNotFound(removed.id))
        );
    }

    #[tokio::test]
    async fn test_list_in_stock_skips_sold_out_items() {
        let (store, _, item) = seeded(5).await;
        store.upsert_item(Item::new(2, "Puff Puff", 50, 0)).await.unwrap();

        let listed = store.list_in_stock().await.unwrap();
        assert_eq!(listed, vec![item]);
    }

    #[tokio::test]
    async fn test_order_status_update() {
        let (store, _, item) = seeded(5).await;
        let mut tx = store.begin_transaction();
        tx.decrement_stock(item.id, 1).await.unwrap();
        let order = order_for(1, &item, 1);
        tx.create_order(order.clone());
        tx.commit().await.unwrap();

        let updated = store
            .update_order_status(
                order.id,
                StatusUpdate {
                    payment_status: Some(PaymentStatus::Paid),
                    order_status: Some(OrderStatus::Delivered),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.order_status, OrderStatus::Delivered);
        assert_eq!(updated.lines(), order.lines());
        assert_eq!(updated.total_amount(), order.total_amount());
    }
}
