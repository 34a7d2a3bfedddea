//! Handlers that write customer events to the log.

use std::sync::Arc;

use super::{CustomerChangedAddressData, CustomerEvent};
use crate::event::{Event, EventDispatcher, EventHandler, HandlerError};

/// First log handler for `CustomerCreated`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstCustomerCreatedLogHandler;

impl EventHandler<CustomerEvent> for FirstCustomerCreatedLogHandler {
    fn name(&self) -> &'static str {
        "FirstCustomerCreatedLogHandler"
    }

    fn handle(&self, event: &Event<CustomerEvent>) -> Result<(), HandlerError> {
        let CustomerEvent::CustomerCreated(data) = event.payload() else {
            return Err(HandlerError::unexpected(self.name(), event));
        };
        tracing::info!(
            customer_id = %data.id,
            occurred_at = %event.occurred_at(),
            "first log handler for event: {}",
            event.kind()
        );
        Ok(())
    }
}

/// Second log handler for `CustomerCreated`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecondCustomerCreatedLogHandler;

impl EventHandler<CustomerEvent> for SecondCustomerCreatedLogHandler {
    fn name(&self) -> &'static str {
        "SecondCustomerCreatedLogHandler"
    }

    fn handle(&self, event: &Event<CustomerEvent>) -> Result<(), HandlerError> {
        let CustomerEvent::CustomerCreated(data) = event.payload() else {
            return Err(HandlerError::unexpected(self.name(), event));
        };
        tracing::info!(
            customer_id = %data.id,
            occurred_at = %event.occurred_at(),
            "second log handler for event: {}",
            event.kind()
        );
        Ok(())
    }
}

/// Logs the new address whenever a customer moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct CustomerAddressChangedLogHandler;

impl CustomerAddressChangedLogHandler {
    /// Formats the log line for an address change.
    pub fn message(data: &CustomerChangedAddressData) -> String {
        format!(
            "Customer address: {}, {} changed to: {}",
            data.id, data.name, data.address
        )
    }
}

impl EventHandler<CustomerEvent> for CustomerAddressChangedLogHandler {
    fn name(&self) -> &'static str {
        "CustomerAddressChangedLogHandler"
    }

    fn handle(&self, event: &Event<CustomerEvent>) -> Result<(), HandlerError> {
        let CustomerEvent::CustomerChangedAddress(data) = event.payload() else {
            return Err(HandlerError::unexpected(self.name(), event));
        };
        tracing::info!(customer_id = %data.id, "{}", Self::message(data));
        Ok(())
    }
}

/// Registers the default customer log handlers on a dispatcher.
pub fn register_customer_log_handlers(dispatcher: &mut EventDispatcher<CustomerEvent>) {
    dispatcher.register(CustomerEvent::CREATED, Arc::new(FirstCustomerCreatedLogHandler));
    dispatcher.register(CustomerEvent::CREATED, Arc::new(SecondCustomerCreatedLogHandler));
    dispatcher.register(
        CustomerEvent::CHANGED_ADDRESS,
        Arc::new(CustomerAddressChangedLogHandler),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::{Address, Customer};

    fn created_event() -> Event<CustomerEvent> {
        let customer = Customer::new("1", "Fulano").unwrap();
        Event::new(CustomerEvent::created(&customer))
    }

    fn changed_address_event() -> Event<CustomerEvent> {
        let mut customer = Customer::new("1", "Fulano").unwrap();
        customer.change_address(Address::new("Rua fulano de tal", 42, "12345-000", "Sao Paulo"));
        Event::new(CustomerEvent::changed_address(&customer).unwrap())
    }

    #[test]
    fn created_handlers_accept_created_events() {
        let event = created_event();
        FirstCustomerCreatedLogHandler.handle(&event).unwrap();
        SecondCustomerCreatedLogHandler.handle(&event).unwrap();
    }

    #[test]
    fn created_handler_rejects_other_kinds() {
        let err = FirstCustomerCreatedLogHandler
            .handle(&changed_address_event())
            .unwrap_err();
        assert!(matches!(
            err,
            HandlerError::UnexpectedEvent {
                handler: "FirstCustomerCreatedLogHandler",
                event_type: "CustomerChangedAddress",
            }
        ));
    }

    #[test]
    fn address_handler_formats_message() {
        let event = changed_address_event();
        let CustomerEvent::CustomerChangedAddress(data) = event.payload() else {
            panic!("expected address change");
        };
        assert_eq!(
            CustomerAddressChangedLogHandler::message(data),
            "Customer address: 1, Fulano changed to: Rua fulano de tal, 42, 12345-000 Sao Paulo"
        );
        CustomerAddressChangedLogHandler.handle(&event).unwrap();
    }

    #[test]
    fn address_handler_rejects_created_events() {
        let result = CustomerAddressChangedLogHandler.handle(&created_event());
        assert!(matches!(result, Err(HandlerError::UnexpectedEvent { .. })));
    }

    #[test]
    fn default_registration_wires_all_handlers() {
        let mut dispatcher = EventDispatcher::<CustomerEvent>::new();
        register_customer_log_handlers(&mut dispatcher);

        let created: Vec<_> = dispatcher
            .handlers_for(CustomerEvent::CREATED)
            .iter()
            .map(|h| h.name())
            .collect();
        assert_eq!(
            created,
            vec![
                "FirstCustomerCreatedLogHandler",
                "SecondCustomerCreatedLogHandler"
            ]
        );
        assert_eq!(dispatcher.handler_count(CustomerEvent::CHANGED_ADDRESS), 1);
    }
}
