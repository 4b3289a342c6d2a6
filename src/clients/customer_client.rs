use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::customer_actor::CustomerError;
use crate::domain::{Customer, CustomerCreate, CustomerId};

/// Client for the customer directory actor.
#[derive(Clone)]
pub struct CustomerClient {
    inner: ResourceClient<Customer>,
}

impl_basic_client!(CustomerClient, Customer, CustomerError, customer);

impl CustomerClient {
    #[instrument(skip(self), fields(customer_name = %params.name))]
    pub async fn create_customer(&self, params: CustomerCreate) -> Result<CustomerId, CustomerError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(CustomerError::from)
    }
}
