//! Customer entity and the events it publishes.

mod address;
mod entity;
mod events;
mod handlers;
mod service;

pub use address::Address;
pub use entity::Customer;
pub use events::{CustomerChangedAddressData, CustomerCreatedData, CustomerEvent};
pub use handlers::{
    CustomerAddressChangedLogHandler, FirstCustomerCreatedLogHandler,
    SecondCustomerCreatedLogHandler, register_customer_log_handlers,
};
pub use service::CustomerService;

use thiserror::Error;

use crate::event::DispatchError;

/// Errors that can occur during customer operations.
#[derive(Debug, Error)]
pub enum CustomerError {
    /// Customer ID is required.
    #[error("Customer ID is required")]
    IdRequired,

    /// Customer name is required.
    #[error("Customer name is required")]
    NameRequired,

    /// A handler failed while the customer's events were being published.
    #[error("Event dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}
