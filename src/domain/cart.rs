use serde::{Deserialize, Serialize};

use super::{CustomerId, ItemId, Money};

/// One requested line of a cart. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    pub quantity: u32,
    /// The price the client last saw for this item.
    pub expected_price: Money,
}

impl CartLine {
    pub fn new(item_id: impl Into<ItemId>, quantity: u32, expected_price: Money) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            expected_price,
        }
    }
}

/// Contact and payment fields passed through to the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub payment_method: String,
}

impl ContactInfo {
    pub fn new(
        email: impl Into<String>,
        phone: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            phone: phone.into(),
            payment_method: payment_method.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_id: CustomerId,
    pub lines: Vec<CartLine>,
    pub contact: ContactInfo,
}

impl CheckoutRequest {
    pub fn new(customer_id: CustomerId, lines: Vec<CartLine>, contact: ContactInfo) -> Self {
        Self {
            customer_id,
            lines,
            contact,
        }
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        distinct_item_ids(&self.lines)
    }
}

/// Distinct item ids of a cart in first-seen order.
pub fn distinct_item_ids(lines: &[CartLine]) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = Vec::with_capacity(lines.len());
    for line in lines {
        if !ids.contains(&line.item_id) {
            ids.push(line.item_id);
        }
    }
    ids
}
