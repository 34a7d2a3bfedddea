use async_trait::async_trait;
use common::OrderId;
use domain::Order;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use crate::{
    RepositoryError, Result, StoreConfig,
    rows::{OrderItemRow, OrderRow, rebuild_order},
    store::OrderRepository,
};

// Headers and items are read in one statement so both come from the same
// snapshot, even while an update commits.
const SELECT_ORDERS_WITH_ITEMS: &str = r#"
    SELECT o.id, o.customer_id, o.total,
           i.id AS item_id, i.name, i.price, i.quantity, i.product_id, i.position
    FROM orders o
    LEFT JOIN order_items i ON i.order_id = o.id
"#;

/// PostgreSQL-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the given configuration.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = config.connect().await?;
        tracing::info!(max_connections = config.max_connections, "connected to postgres");
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: &PgRow) -> Result<OrderRow> {
        Ok(OrderRow {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            total: row.try_get("total")?,
        })
    }

    // The item columns of an order without items are NULL.
    fn row_to_item(row: &PgRow) -> Result<Option<OrderItemRow>> {
        let Some(id) = row.try_get::<Option<String>, _>("item_id")? else {
            return Ok(None);
        };
        Ok(Some(OrderItemRow {
            id,
            order_id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
            product_id: row.try_get("product_id")?,
            position: row.try_get("position")?,
        }))
    }

    /// Groups joined rows, sorted by order id, into orders.
    fn rows_to_orders(rows: &[PgRow]) -> Result<Vec<Order>> {
        let mut grouped: Vec<(OrderRow, Vec<OrderItemRow>)> = Vec::new();
        for row in rows {
            let header = Self::row_to_order(row)?;
            let item = Self::row_to_item(row)?;
            match grouped.last_mut() {
                Some((open, items)) if open.id == header.id => items.extend(item),
                _ => grouped.push((header, item.into_iter().collect())),
            }
        }

        grouped
            .into_iter()
            .map(|(header, items)| rebuild_order(header, items))
            .collect()
    }

    async fn insert_items(conn: &mut PgConnection, items: &[OrderItemRow]) -> Result<()> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, name, price, quantity, product_id, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.name)
            .bind(item.price)
            .bind(item.quantity)
            .bind(&item.product_id)
            .bind(item.position)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn create(&self, order: &Order) -> Result<()> {
        let header = OrderRow::from_order(order);
        let items = OrderItemRow::all_from_order(order)?;

        // Start a transaction
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO orders (id, customer_id, total) VALUES ($1, $2, $3)")
            .bind(&header.id)
            .bind(&header.customer_id)
            .bind(header.total)
            .execute(&mut *tx)
            .await?;

        Self::insert_items(&mut *tx, &items).await?;

        tx.commit().await?;

        metrics::counter!("orders_created").increment(1);
        metrics::counter!("order_items_written").increment(items.len() as u64);
        tracing::debug!(item_count = items.len(), "order created");
        Ok(())
    }

    async fn find(&self, id: &OrderId) -> Result<Order> {
        let query = format!("{SELECT_ORDERS_WITH_ITEMS} WHERE o.id = $1 ORDER BY i.position ASC");
        let rows = sqlx::query(&query)
            .bind(id.as_str())
            .fetch_all(&self.pool)
            .await?;

        Self::rows_to_orders(&rows)?
            .pop()
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let query = format!("{SELECT_ORDERS_WITH_ITEMS} ORDER BY o.id ASC, i.position ASC");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        Self::rows_to_orders(&rows)
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn update(&self, order: &Order) -> Result<()> {
        let header = OrderRow::from_order(order);
        let items = OrderItemRow::all_from_order(order)?;

        // Dropping the transaction without commit rolls every step back.
        let mut tx = self.pool.begin().await?;

        // Lock the header so concurrent updates of the same order serialize.
        let exists = sqlx::query("SELECT 1 FROM orders WHERE id = $1 FOR UPDATE")
            .bind(&header.id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !exists {
            return Err(RepositoryError::NotFound(order.id().clone()));
        }

        let deleted = sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(&header.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        Self::insert_items(&mut *tx, &items).await?;

        sqlx::query("UPDATE orders SET total = $2 WHERE id = $1")
            .bind(&header.id)
            .bind(header.total)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        metrics::counter!("orders_updated").increment(1);
        metrics::counter!("order_items_written").increment(items.len() as u64);
        tracing::debug!(deleted, inserted = items.len(), "order items replaced");
        Ok(())
    }
}
