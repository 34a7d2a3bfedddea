//! Order aggregate persistence.
//!
//! An order is stored as a header row plus one row per item. Updates use a
//! replace-children strategy (delete all item rows, insert the current ones,
//! rewrite the total) inside a single transaction.

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod rows;
pub mod store;

pub use config::StoreConfig;
pub use error::{RepositoryError, Result};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use store::{OrderRepository, OrderRepositoryExt};
