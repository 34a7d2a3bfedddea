//! Customer service that publishes customer events.

use common::CustomerId;

use super::{Address, Customer, CustomerError, CustomerEvent};
use crate::event::{Event, EventDispatcher};

/// Performs customer operations and publishes the resulting events.
///
/// The service borrows the dispatcher it publishes to; whoever owns the
/// dispatcher decides which handlers are listening.
pub struct CustomerService<'a> {
    dispatcher: &'a EventDispatcher<CustomerEvent>,
}

impl<'a> CustomerService<'a> {
    /// Creates a service publishing to `dispatcher`.
    pub fn new(dispatcher: &'a EventDispatcher<CustomerEvent>) -> Self {
        Self { dispatcher }
    }

    /// Creates a customer and publishes `CustomerCreated`.
    #[tracing::instrument(skip_all)]
    pub fn create(
        &self,
        id: impl Into<CustomerId>,
        name: impl Into<String>,
    ) -> Result<Customer, CustomerError> {
        let customer = Customer::new(id, name)?;
        self.dispatcher
            .notify(&Event::new(CustomerEvent::created(&customer)))?;
        tracing::info!(customer_id = %customer.id(), "customer created");
        Ok(customer)
    }

    /// Changes a customer's address and publishes `CustomerChangedAddress`.
    ///
    /// The address stays changed even if a handler fails; the error is
    /// returned so the caller knows the notification did not complete.
    #[tracing::instrument(skip(self, customer, address), fields(customer_id = %customer.id()))]
    pub fn change_address(
        &self,
        customer: &mut Customer,
        address: Address,
    ) -> Result<(), CustomerError> {
        customer.change_address(address);
        if let Some(event) = CustomerEvent::changed_address(customer) {
            self.dispatcher.notify(&Event::new(event))?;
        }
        Ok(())
    }
}
