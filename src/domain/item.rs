use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Integral amount in currency minor units (cents). Never rounded.
pub type Money = u64;

/// Type-safe identifier for sellable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item_{}", self.0)
    }
}

/// A sellable menu item as held by the inventory store.
///
/// `stock` never goes negative after a committed write, and an item with
/// `available == false` is never purchasable regardless of its stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub stock: u32,
    pub available: bool,
}

impl Item {
    /// Creates an available item with empty display fields.
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            price,
            stock,
            available: true,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

/// Admin edit of an item. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<u32>,
    pub available: Option<bool>,
}

impl ItemPatch {
    pub fn price(price: Money) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn stock(stock: u32) -> Self {
        Self {
            stock: Some(stock),
            ..Self::default()
        }
    }

    pub fn available(available: bool) -> Self {
        Self {
            available: Some(available),
            ..Self::default()
        }
    }

    pub fn apply(self, item: &mut Item) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(stock) = self.stock {
            item.stock = stock;
        }
        if let Some(available) = self.available {
            item.available = available;
        }
    }
}
