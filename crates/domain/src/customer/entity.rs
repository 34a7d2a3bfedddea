use common::CustomerId;
use serde::{Deserialize, Serialize};

use super::{Address, CustomerError};

/// A customer that can place orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    name: String,
    address: Option<Address>,
}

impl Customer {
    /// Creates a customer without an address.
    pub fn new(id: impl Into<CustomerId>, name: impl Into<String>) -> Result<Self, CustomerError> {
        let customer = Self {
            id: id.into(),
            name: name.into(),
            address: None,
        };
        customer.validate()?;
        Ok(customer)
    }

    fn validate(&self) -> Result<(), CustomerError> {
        if self.id.is_blank() {
            return Err(CustomerError::IdRequired);
        }
        if self.name.trim().is_empty() {
            return Err(CustomerError::NameRequired);
        }
        Ok(())
    }

    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Replaces the customer's address.
    ///
    /// This only changes state; publishing the matching event is the job of
    /// [`CustomerService::change_address`](super::CustomerService::change_address).
    pub fn change_address(&mut self, address: Address) {
        self.address = Some(address);
    }
}
