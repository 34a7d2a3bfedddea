use async_trait::async_trait;
use common::OrderId;
use domain::Order;

use crate::{RepositoryError, Result};

/// Persistence for order aggregates.
///
/// An order is stored as a header row plus one row per item; the two are
/// always read and written together. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a new order with all of its items as one unit.
    ///
    /// The stored total is computed from the items at call time. Fails with
    /// `Conflict` if the order ID (or any item ID) already exists.
    async fn create(&self, order: &Order) -> Result<()>;

    /// Loads an order and its items.
    ///
    /// Fails with `NotFound` when no order has this ID.
    async fn find(&self, id: &OrderId) -> Result<Order>;

    /// Loads every order with its items.
    ///
    /// The order of the returned collection is defined by the storage engine.
    async fn find_all(&self) -> Result<Vec<Order>>;

    /// Replaces the stored items of an existing order and rewrites its total.
    ///
    /// Deletes every stored item of the order, inserts the current items,
    /// then overwrites the total. The three steps run as one transaction:
    /// if any of them fails, nothing changes. Fails with `NotFound` when no
    /// order has this ID.
    async fn update(&self, order: &Order) -> Result<()>;
}

/// Extension trait providing convenience methods for order repositories.
#[async_trait]
pub trait OrderRepositoryExt: OrderRepository {
    /// Checks if an order exists.
    async fn exists(&self, id: &OrderId) -> Result<bool> {
        match self.find(id).await {
            Ok(_) => Ok(true),
            Err(RepositoryError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Creates the order if it is new, otherwise reconciles it.
    async fn save(&self, order: &Order) -> Result<()> {
        if self.exists(order.id()).await? {
            self.update(order).await
        } else {
            self.create(order).await
        }
    }
}

// Blanket implementation for all OrderRepository implementations
impl<T: OrderRepository + ?Sized> OrderRepositoryExt for T {}
