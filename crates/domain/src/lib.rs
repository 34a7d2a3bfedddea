//! Domain layer: synchronous domain events, customers, and the order aggregate.
//!
//! This crate provides:
//! - [`EventDispatcher`] and the [`EventHandler`] trait for in-process event dispatch
//! - Customer entity, its events, and the handlers that log them
//! - Order aggregate with derived totals

pub mod customer;
pub mod event;
pub mod order;

pub use customer::{
    Address, Customer, CustomerAddressChangedLogHandler, CustomerChangedAddressData,
    CustomerCreatedData, CustomerError, CustomerEvent, CustomerService,
    FirstCustomerCreatedLogHandler, SecondCustomerCreatedLogHandler,
    register_customer_log_handlers,
};
pub use event::{DispatchError, DomainEvent, Event, EventDispatcher, EventHandler, HandlerError};
pub use order::{Money, Order, OrderError, OrderItem};

pub use common::{CustomerId, ItemId, OrderId, ProductId};
