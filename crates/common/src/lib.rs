//! Identifier types shared by the domain and storage crates.

mod types;

pub use types::{CustomerId, ItemId, OrderId, ProductId};
