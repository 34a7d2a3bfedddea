use common::CustomerId;
use serde::{Deserialize, Serialize};

use super::{Address, Customer};
use crate::event::DomainEvent;

/// Events published about customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CustomerEvent {
    /// A customer was created.
    CustomerCreated(CustomerCreatedData),

    /// A customer's address was changed.
    CustomerChangedAddress(CustomerChangedAddressData),
}

impl CustomerEvent {
    pub const CREATED: &'static str = "CustomerCreated";
    pub const CHANGED_ADDRESS: &'static str = "CustomerChangedAddress";

    /// Builds the creation event for a customer.
    pub fn created(customer: &Customer) -> Self {
        Self::CustomerCreated(CustomerCreatedData {
            id: customer.id().clone(),
            name: customer.name().to_string(),
        })
    }

    /// Builds the address-change event from the customer's current address.
    ///
    /// Returns `None` when the customer has no address.
    pub fn changed_address(customer: &Customer) -> Option<Self> {
        customer.address().map(|address| {
            Self::CustomerChangedAddress(CustomerChangedAddressData {
                id: customer.id().clone(),
                name: customer.name().to_string(),
                address: address.clone(),
            })
        })
    }
}

impl DomainEvent for CustomerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CustomerEvent::CustomerCreated(_) => Self::CREATED,
            CustomerEvent::CustomerChangedAddress(_) => Self::CHANGED_ADDRESS,
        }
    }
}

/// Data for CustomerCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerCreatedData {
    pub id: CustomerId,
    pub name: String,
}

/// Data for CustomerChangedAddress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerChangedAddressData {
    pub id: CustomerId,
    pub name: String,
    pub address: Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_match_dispatch_keys() {
        let mut customer = Customer::new("1", "Fulano").unwrap();
        assert_eq!(
            CustomerEvent::created(&customer).event_type(),
            "CustomerCreated"
        );

        assert!(CustomerEvent::changed_address(&customer).is_none());
        customer.change_address(Address::new("Rua fulano", 10, "12345", "City"));
        let event = CustomerEvent::changed_address(&customer).unwrap();
        assert_eq!(event.event_type(), "CustomerChangedAddress");
    }

    #[test]
    fn serializes_with_type_tag() {
        let customer = Customer::new("1", "Fulano").unwrap();
        let json = serde_json::to_value(CustomerEvent::created(&customer)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "CustomerCreated",
                "data": { "id": "1", "name": "Fulano" }
            })
        );
    }
}
