use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::actor_framework::ResourceActor;
use crate::checkout::CheckoutEngine;
use crate::clients::{CustomerClient, StoreClient};
use crate::config::Config;
use crate::domain::{Customer, CustomerId};
use crate::notifications::{NotificationClient, NotificationService, Notifier};
use crate::store::StoreService;

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct OrderSystem {
    pub checkout: CheckoutEngine,
    pub store_client: StoreClient,
    pub customer_client: CustomerClient,
    notification_client: NotificationClient,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts every actor. Must be called from within a tokio runtime.
    pub fn start(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        // 1. Notifications first: the store announces admin edits through them.
        let (notification_service, notification_client) =
            NotificationService::new(config.notification_queue, notifier, config.admin_email.clone());
        let notification_handle = tokio::spawn(notification_service.run());
        let dispatcher = Arc::new(notification_client.clone());

        // 2. Inventory and order store
        let (store_service, store_client) = StoreService::new(config.store_buffer, dispatcher.clone());
        let store_handle = tokio::spawn(store_service.run());

        // 3. Customer directory
        let customer_id_counter = Arc::new(AtomicU64::new(1));
        let next_customer_id = move || CustomerId(customer_id_counter.fetch_add(1, Ordering::SeqCst));
        let (customer_actor, customer_resource_client) =
            ResourceActor::<Customer>::new(config.customer_buffer, next_customer_id);
        let customer_client = CustomerClient::new(customer_resource_client);
        let customer_handle = tokio::spawn(customer_actor.run());

        let checkout = CheckoutEngine::new(
            store_client.clone(),
            customer_client.clone(),
            dispatcher,
            config.max_commit_retries,
        );

        info!("Order system started");
        Self {
            checkout,
            store_client,
            customer_client,
            notification_client,
            // Notifications last: they are joined after everything that feeds them.
            handles: vec![store_handle, customer_handle, notification_handle],
        }
    }

    /// Stops the store before notifications so its last announcements are still
    /// delivered.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        if let Err(e) = self.store_client.shutdown().await {
            warn!(error = %e, "Store already stopped");
        }

        // The customer actor stops once its last client is gone.
        drop(self.checkout);
        drop(self.customer_client);
        drop(self.store_client);

        let mut handles = self.handles.into_iter();
        let notification_handle = handles.next_back();
        for handle in handles {
            join_actor(handle).await?;
        }

        if let Err(e) = self.notification_client.shutdown().await {
            warn!(error = %e, "Notification service already stopped");
        }
        if let Some(handle) = notification_handle {
            join_actor(handle).await?;
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

async fn join_actor(handle: JoinHandle<()>) -> Result<(), String> {
    handle.await.map_err(|e| {
        error!("Actor task failed: {:?}", e);
        format!("Actor task failed: {:?}", e)
    })
}
