//! Placed customer orders.
//!
//! Orders are created exactly once, by a successful checkout. Line snapshots and
//! the total are fixed at creation. Only the two status fields can change afterwards,
//! through the admin status edit on the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use super::{ContactInfo, CustomerId, ItemId, Money};

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Delivered,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(
            match self {
                PaymentStatus::Pending => "Pending",
                PaymentStatus::Paid => "Paid",
                PaymentStatus::Failed => "Failed",
            },
            f,
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(
            match self {
                OrderStatus::Pending => "Pending",
                OrderStatus::Delivered => "Delivered",
            },
            f,
        )
    }
}

/// Name and price of an item frozen at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    /// `None` when the product does not fit in [`Money`].
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(Money::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    lines: Vec<OrderLine>,
    total_amount: Money,
    pub payment_method: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Builds a `Pending/Pending` order. Returns `None` if the total overflows.
    pub fn place(customer_id: CustomerId, lines: Vec<OrderLine>, contact: &ContactInfo) -> Option<Self> {
        let total_amount = lines
            .iter()
            .try_fold(0, |total: Money, line| total.checked_add(line.subtotal()?))?;

        Some(Self {
            id: OrderId::generate(),
            customer_id,
            lines,
            total_amount,
            payment_method: contact.payment_method.clone(),
            contact_email: contact.email.clone(),
            contact_phone: contact.phone.clone(),
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Pending,
            created_at: Utc::now(),
        })
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Total quantity ordered of one item across all of its lines.
    pub fn quantity_of(&self, item_id: ItemId) -> u64 {
        self.lines
            .iter()
            .filter(|line| line.item_id == item_id)
            .map(|line| u64::from(line.quantity))
            .sum()
    }
}

/// Admin status edit. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub payment_status: Option<PaymentStatus>,
    pub order_status: Option<OrderStatus>,
}

impl StatusUpdate {
    pub fn apply(self, order: &mut Order) {
        if let Some(payment_status) = self.payment_status {
            order.payment_status = payment_status;
        }
        if let Some(order_status) = self.order_status {
            order.order_status = order_status;
        }
    }
}
