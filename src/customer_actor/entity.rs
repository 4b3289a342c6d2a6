use crate::actor_framework::Entity;
use crate::domain::{Customer, CustomerCreate, CustomerId, CustomerPatch};

impl Entity for Customer {
    type Id = CustomerId;
    type CreateParams = CustomerCreate;
    type Patch = CustomerPatch;

    fn id(&self) -> &CustomerId {
        &self.id
    }

    fn from_create_params(id: CustomerId, params: CustomerCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            name: params.name,
            email: params.email,
            phone: params.phone,
        })
    }

    /// Rejects customers without a way to reach them.
    fn on_create(&mut self) -> Result<(), String> {
        require_contact(self)
    }

    fn on_update(&mut self, patch: CustomerPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        require_contact(self)
    }
}

fn require_contact(customer: &Customer) -> Result<(), String> {
    if customer.email.trim().is_empty() {
        return Err("Email required".to_string());
    }
    if customer.phone.trim().is_empty() {
        return Err("Phone number required".to_string());
    }
    Ok(())
}
