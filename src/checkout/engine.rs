use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::CheckoutFailure;
use crate::clients::{CustomerClient, StoreClient};
use crate::domain::{
    distinct_item_ids, CartLine, CheckoutRequest, ContactInfo, Customer, CustomerContact,
    CustomerId, Item, ItemId, Order, OrderLine,
};
use crate::notifications::NotificationDispatcher;
use crate::store::{StoreError, Transaction};
use crate::validator::{validate_cart, InventoryView, LineProblem};

/// Turns a cart into exactly one persisted order, or into a failure that left
/// no trace in the store.
///
/// Each attempt runs inside one [`Transaction`]: load, validate, decrement, create
/// order, commit. A commit refused because another writer touched the same items
/// is retried from scratch up to `max_commit_retries` times.
#[derive(Clone)]
pub struct CheckoutEngine {
    store: StoreClient,
    customers: CustomerClient,
    notifications: Arc<dyn NotificationDispatcher>,
    max_commit_retries: u32,
}

impl CheckoutEngine {
    pub fn new(
        store: StoreClient,
        customers: CustomerClient,
        notifications: Arc<dyn NotificationDispatcher>,
        max_commit_retries: u32,
    ) -> Self {
        Self {
            store,
            customers,
            notifications,
            max_commit_retries,
        }
    }

    /// Pre-flight check: the problem list a checkout of `cart` would report right
    /// now. Never writes anything.
    #[instrument(skip_all, fields(lines = cart.len()))]
    pub async fn validate(&self, cart: &[CartLine]) -> Result<Vec<LineProblem>, CheckoutFailure> {
        debug!("Validating cart");
        check_cart(cart)?;

        let view: HashMap<ItemId, Item> = self
            .store
            .snapshot(distinct_item_ids(cart))
            .await?
            .into_iter()
            .filter_map(|entry| entry.item.map(|item| (entry.item_id, item)))
            .collect();

        let problems = validate_cart(cart, &view);
        info!(problem_count = problems.len(), "Cart validated");
        Ok(problems)
    }

    #[instrument(skip_all, fields(customer_id = %request.customer_id, lines = request.lines.len()))]
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<Order, CheckoutFailure> {
        debug!("Processing checkout");
        check_cart(&request.lines)?;
        check_contact(&request.contact)?;
        let customer = self.resolve_customer(request.customer_id).await?;

        let mut attempt: u32 = 0;
        let order = loop {
            attempt += 1;
            match self.attempt(&request).await {
                Ok(committed) => break committed,
                Err(CheckoutFailure::Storage(StoreError::Conflict(item_id)))
                    if attempt <= self.max_commit_retries =>
                {
                    warn!(%item_id, attempt, "Commit conflict, retrying checkout");
                }
                Err(failure) => {
                    match &failure {
                        CheckoutFailure::Storage(e) => error!(error = %e, attempt, "Checkout failed"),
                        other => info!(kind = ?other.kind(), "Checkout rejected"),
                    }
                    return Err(failure);
                }
            }
        };

        info!(order_id = %order.id, total = order.total_amount(), attempt, "Checkout committed");
        self.dispatch(&order, &customer);
        Ok(order)
    }

    async fn resolve_customer(&self, id: CustomerId) -> Result<Customer, CheckoutFailure> {
        match self.customers.get_customer(id).await {
            Ok(Some(customer)) => Ok(customer),
            Ok(None) => Err(CheckoutFailure::InvalidRequest(format!("Unknown customer: {id}"))),
            Err(e) => Err(StoreError::Unavailable(format!("customer lookup failed: {e}")).into()),
        }
    }

    /// One pass over a fresh transaction. Every early return drops the transaction
    /// before commit, so nothing it buffered is written.
    async fn attempt(&self, request: &CheckoutRequest) -> Result<Order, CheckoutFailure> {
        let mut tx = self.store.begin_transaction();
        tx.load(request.item_ids()).await?;

        let problems = validate_cart(&request.lines, &tx);
        if !problems.is_empty() {
            tx.abort();
            return Err(CheckoutFailure::ItemsUnavailable(problems));
        }

        let lines = order_lines(&request.lines, &tx)?;
        let Some(order) = Order::place(request.customer_id, lines, &request.contact) else {
            tx.abort();
            return Err(CheckoutFailure::InvalidRequest("Order total overflows".into()));
        };

        // Validation already covered every line, so a refusal here is a storage fault.
        for line in &request.lines {
            tx.decrement_stock(line.item_id, line.quantity).await?;
        }

        tx.create_order(order.clone());
        let receipt = tx.commit().await?;
        debug!(items = receipt.stock_levels.len(), "Stock decremented");
        Ok(order)
    }

    /// Post-commit, best effort. Nothing here can undo or alter the order.
    ///
    /// Stock changes are announced by the store itself as part of the commit.
    fn dispatch(&self, order: &Order, customer: &Customer) {
        let contact = CustomerContact {
            customer_id: customer.id,
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
        };
        if let Err(e) = self.notifications.notify_order_placed(order, &contact) {
            warn!(order_id = %order.id, error = %e, "Order notification dropped");
        }
    }
}

fn check_cart(cart: &[CartLine]) -> Result<(), CheckoutFailure> {
    if cart.is_empty() {
        return Err(CheckoutFailure::InvalidRequest("Cart is empty".into()));
    }
    if let Some(index) = cart.iter().position(|line| line.quantity == 0) {
        return Err(CheckoutFailure::InvalidRequest(format!(
            "Line {index} has zero quantity"
        )));
    }
    Ok(())
}

fn check_contact(contact: &ContactInfo) -> Result<(), CheckoutFailure> {
    let fields = [
        ("email", &contact.email),
        ("phone", &contact.phone),
        ("payment method", &contact.payment_method),
    ];
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(CheckoutFailure::InvalidRequest(format!("Contact {name} required")));
        }
    }
    Ok(())
}

/// Freezes the current name and price of every line's item.
fn order_lines(cart: &[CartLine], tx: &Transaction) -> Result<Vec<OrderLine>, StoreError> {
    cart.iter()
        .map(|line| {
            let item = tx.item(&line.item_id).ok_or(StoreError::ItemNotFound(line.item_id))?;
            Ok(OrderLine {
                item_id: item.id,
                name: item.name.clone(),
                quantity: line.quantity,
                unit_price: item.price,
            })
        })
        .collect()
}
