use serde::Serialize;
use std::fmt::Write;

use crate::domain::{CustomerContact, ItemId, Money, Order};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A single deliverable produced from a queued event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    Email(EmailMessage),
    InventoryChanged { item_id: ItemId, stock: u32 },
}

pub fn format_money(amount: Money) -> String {
    format!("${}.{:02}", amount / 100, amount % 100)
}

pub fn order_confirmation(order: &Order, contact: &CustomerContact) -> EmailMessage {
    let mut body = format!("Thank you for placing your order, {}!\n\n", contact.name);
    let _ = writeln!(body, "Order ID: {}", order.id);
    for line in order.lines() {
        let _ = writeln!(
            body,
            "  {} x {} @ {}",
            line.quantity,
            line.name,
            format_money(line.unit_price)
        );
    }
    let _ = writeln!(body, "Total: {}", format_money(order.total_amount()));
    let _ = writeln!(body, "Date: {}", order.created_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(body, "Payment method: {}", order.payment_method);
    body.push_str("\nWe will notify you when it's on its way.\n");

    EmailMessage {
        to: order.contact_email.clone(),
        subject: "Order Confirmation".to_string(),
        body,
    }
}

pub fn admin_order_alert(order: &Order, contact: &CustomerContact, admin_email: &str) -> EmailMessage {
    let mut body = String::from("New order received.\n\n");
    let _ = writeln!(body, "Customer: {} ({})", contact.name, order.contact_email);
    let _ = writeln!(body, "Phone: {}", order.contact_phone);
    let _ = writeln!(body, "Order ID: {}", order.id);
    let _ = writeln!(body, "Total: {}", format_money(order.total_amount()));
    let _ = writeln!(body, "Payment method: {}", order.payment_method);

    EmailMessage {
        to: admin_email.to_string(),
        subject: "New Order Received".to_string(),
        body,
    }
}

/// Customer confirmation first, then the admin alert.
pub fn order_placed(order: &Order, contact: &CustomerContact, admin_email: &str) -> Vec<Notification> {
    vec![
        Notification::Email(order_confirmation(order, contact)),
        Notification::Email(admin_order_alert(order, contact, admin_email)),
    ]
}
