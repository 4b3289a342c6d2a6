use std::error::Error;
use std::sync::Arc;

use food_checkout::domain::{CartLine, CheckoutRequest, ContactInfo, CustomerCreate, Item, ItemPatch};
use food_checkout::notifications::LogNotifier;
use food_checkout::{setup_tracing, Config, FailureResponse, OrderSystem};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::from_env()?;
    info!(?config, "Starting checkout demo");

    let system = OrderSystem::start(&config, Arc::new(LogNotifier));

    let customer_id = system
        .customer_client
        .create_customer(CustomerCreate::new("Alice", "alice@example.com", "0800000000"))
        .await?;
    info!(customer_id = %customer_id, "Customer registered");

    let jollof = system
        .store_client
        .upsert_item(Item::new(1, "Jollof Rice", 1250, 5).with_category("Mains"))
        .await?;
    let puff_puff = system
        .store_client
        .upsert_item(Item::new(2, "Puff Puff", 300, 20).with_category("Snacks"))
        .await?;

    let cart = vec![
        CartLine::new(jollof.id, 2, jollof.price),
        CartLine::new(puff_puff.id, 6, puff_puff.price),
    ];
    let contact = ContactInfo::new("alice@example.com", "0800000000", "card");

    let problems = system.checkout.validate(&cart).await?;
    info!(problem_count = problems.len(), "Pre-flight check done");

    let span = tracing::info_span!("checkout");
    let placed = system
        .checkout
        .checkout(CheckoutRequest::new(customer_id, cart.clone(), contact.clone()))
        .instrument(span)
        .await;
    match &placed {
        Ok(order) => info!(order_id = %order.id, total = order.total_amount(), "Order placed"),
        Err(failure) => error!(error = %failure, "Checkout failed"),
    }

    // The same cart again, after a price change: rejected with the new price.
    system
        .store_client
        .patch_item(jollof.id, ItemPatch::price(1400))
        .await?;
    let span = tracing::info_span!("stale_checkout");
    let stale = system
        .checkout
        .checkout(CheckoutRequest::new(customer_id, cart, contact))
        .instrument(span)
        .await;
    if let Err(failure) = &stale {
        let response = serde_json::to_string_pretty(&FailureResponse::from(failure))?;
        info!(%response, "Stale cart rejected");
    }

    for item in system.store_client.list_in_stock().await? {
        info!(item_id = %item.id, stock = item.stock, "In stock");
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
