use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use domain::Order;
use tokio::sync::RwLock;

use crate::{
    RepositoryError, Result,
    rows::{OrderItemRow, OrderRow, rebuild_order},
    store::OrderRepository,
};

/// The two tables of the in-memory engine.
#[derive(Debug, Clone, Default)]
struct Tables {
    orders: HashMap<String, OrderRow>,
    items: Vec<OrderItemRow>,
}

impl Tables {
    fn insert_order(&mut self, row: OrderRow) -> Result<()> {
        if self.orders.contains_key(&row.id) {
            return Err(RepositoryError::Conflict(format!(
                "order {} already exists",
                row.id
            )));
        }
        self.orders.insert(row.id.clone(), row);
        Ok(())
    }

    // Item IDs are unique across all orders, like the primary key of
    // order_items.
    fn insert_item(&mut self, row: OrderItemRow) -> Result<()> {
        if !self.orders.contains_key(&row.order_id) {
            return Err(RepositoryError::Conflict(format!(
                "item {} references missing order {}",
                row.id, row.order_id
            )));
        }
        if self.items.iter().any(|existing| existing.id == row.id) {
            return Err(RepositoryError::Conflict(format!(
                "item {} already exists",
                row.id
            )));
        }
        self.items.push(row);
        Ok(())
    }

    fn delete_items_of(&mut self, order_id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|row| row.order_id != order_id);
        before - self.items.len()
    }

    fn items_of(&self, order_id: &str) -> Vec<OrderItemRow> {
        self.items
            .iter()
            .filter(|row| row.order_id == order_id)
            .cloned()
            .collect()
    }

    fn load(&self, id: &OrderId) -> Result<Order> {
        let header = self
            .orders
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        let items = self.items_of(&header.id);
        rebuild_order(header, items)
    }
}

/// In-memory order repository for testing.
///
/// This implementation keeps header and item rows in memory and provides
/// the same interface as the PostgreSQL implementation. Writes are staged on
/// a copy of the tables and only swapped in when every step succeeded, which
/// gives each call the all-or-nothing behavior of a transaction.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Returns the number of stored item rows across all orders.
    pub async fn item_row_count(&self) -> usize {
        self.tables.read().await.items.len()
    }

    /// Clears all orders and items.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.orders.clear();
        tables.items.clear();
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn create(&self, order: &Order) -> Result<()> {
        let header = OrderRow::from_order(order);
        let items = OrderItemRow::all_from_order(order)?;
        let item_count = items.len();

        let mut tables = self.tables.write().await;
        let mut staged = (*tables).clone();
        staged.insert_order(header)?;
        for row in items {
            staged.insert_item(row)?;
        }
        *tables = staged;

        metrics::counter!("orders_created").increment(1);
        metrics::counter!("order_items_written").increment(item_count as u64);
        tracing::debug!(item_count, "order created");
        Ok(())
    }

    async fn find(&self, id: &OrderId) -> Result<Order> {
        self.tables.read().await.load(id)
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        tables
            .orders
            .values()
            .map(|header| rebuild_order(header.clone(), tables.items_of(&header.id)))
            .collect()
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn update(&self, order: &Order) -> Result<()> {
        let header = OrderRow::from_order(order);
        let items = OrderItemRow::all_from_order(order)?;
        let item_count = items.len();

        let mut tables = self.tables.write().await;
        if !tables.orders.contains_key(&header.id) {
            return Err(RepositoryError::NotFound(order.id().clone()));
        }

        let mut staged = (*tables).clone();
        let deleted = staged.delete_items_of(&header.id);
        for row in items {
            staged.insert_item(row)?;
        }
        if let Some(stored) = staged.orders.get_mut(&header.id) {
            stored.total = header.total;
        }
        *tables = staged;

        metrics::counter!("orders_updated").increment(1);
        metrics::counter!("order_items_written").increment(item_count as u64);
        tracing::debug!(deleted, inserted = item_count, "order items replaced");
        Ok(())
    }
}
