//! Cart validation against a read-only view of the inventory.
//!
//! [`validate_cart`] never mutates anything. The checkout engine runs it against the
//! snapshot held by its open [`Transaction`](crate::store::Transaction); the pre-flight
//! check runs it against a plain snapshot map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{CartLine, Item, ItemId, Money};

/// Read access to current items.
pub trait InventoryView {
    fn item(&self, id: &ItemId) -> Option<&Item>;
}

impl InventoryView for HashMap<ItemId, Item> {
    fn item(&self, id: &ItemId) -> Option<&Item> {
        self.get(id)
    }
}

/// Why one cart line cannot be purchased as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemKind {
    NotFound,
    Unavailable,
    InsufficientStock { remaining: u32 },
    PriceChanged { current_price: Money },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProblem {
    /// Position of the offending line in the submitted cart.
    pub line: usize,
    pub item_id: ItemId,
    pub item_name: Option<String>,
    pub problem: ProblemKind,
}

/// Reports every problem of every line. An empty result means the cart is
/// purchasable exactly as submitted.
///
/// A line whose item is missing gets only [`ProblemKind::NotFound`]; otherwise all
/// applicable problems are reported, in a fixed order.
///
/// Lines repeating an item draw on the same stock: a line is short when the quantity
/// requested by it and every earlier line for that item exceeds the stock.
pub fn validate_cart<V>(cart: &[CartLine], view: &V) -> Vec<LineProblem>
where
    V: InventoryView + ?Sized,
{
    let mut problems = Vec::new();
    let mut requested_so_far: HashMap<ItemId, u64> = HashMap::new();

    for (line, requested) in cart.iter().enumerate() {
        let Some(item) = view.item(&requested.item_id) else {
            problems.push(LineProblem {
                line,
                item_id: requested.item_id,
                item_name: None,
                problem: ProblemKind::NotFound,
            });
            continue;
        };

        let mut report = |problem: ProblemKind| {
            problems.push(LineProblem {
                line,
                item_id: item.id,
                item_name: Some(item.name.clone()),
                problem,
            })
        };

        if !item.available {
            report(ProblemKind::Unavailable);
        }
        let requested_total = requested_so_far.entry(item.id).or_default();
        *requested_total += u64::from(requested.quantity);
        if *requested_total > u64::from(item.stock) {
            report(ProblemKind::InsufficientStock {
                remaining: item.stock,
            });
        }
        if item.price != requested.expected_price {
            report(ProblemKind::PriceChanged {
                current_price: item.price,
            });
        }
    }

    problems
}
