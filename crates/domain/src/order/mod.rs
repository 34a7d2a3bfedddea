//! Order aggregate and related types.

mod aggregate;
mod value_objects;

pub use aggregate::Order;
pub use value_objects::{Money, OrderItem};

use common::ItemId;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Order ID is required.
    #[error("Order ID is required")]
    IdRequired,

    /// Customer ID is required.
    #[error("Customer ID is required")]
    CustomerIdRequired,

    /// Order has no items.
    #[error("Order has no items")]
    NoItems,

    /// Invalid quantity.
    #[error("Invalid quantity for item {item_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { item_id: ItemId, quantity: u32 },

    /// Invalid price.
    #[error("Invalid price for item {item_id}: {price} (must not be negative)")]
    InvalidPrice { item_id: ItemId, price: Money },

    /// An item with the same ID is already in the order.
    #[error("Duplicate item: {item_id}")]
    DuplicateItem { item_id: ItemId },

    /// The order total does not fit in a money amount.
    #[error("Order total overflows")]
    TotalOverflow,

    /// Item not found in order.
    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: ItemId },
}
