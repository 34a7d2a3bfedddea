//! Persisted row shapes and their conversion to and from the aggregate.

use common::{CustomerId, ItemId, OrderId, ProductId};
use domain::{Money, Order, OrderItem};

use crate::{RepositoryError, Result};

/// A row of the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: String,
    pub customer_id: String,
    /// Total in cents, recomputed from the items on every write.
    pub total: i64,
}

impl OrderRow {
    /// Builds the header row for an order, computing the total now.
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            total: order.total().cents(),
        }
    }
}

/// A row of the `order_items` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRow {
    pub id: String,
    /// Back-reference to the owning order.
    pub order_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub product_id: String,
    /// Index of the item within its order.
    pub position: i32,
}

impl OrderItemRow {
    /// Builds the item row for the item at `position` of `order_id`.
    pub fn from_item(order_id: &OrderId, position: usize, item: &OrderItem) -> Result<Self> {
        let quantity = i32::try_from(item.quantity).map_err(|_| {
            RepositoryError::InvalidRow(format!(
                "quantity {} of item {} does not fit the quantity column",
                item.quantity, item.id
            ))
        })?;
        let position = i32::try_from(position).map_err(|_| {
            RepositoryError::InvalidRow(format!("order {order_id} has too many items"))
        })?;

        Ok(Self {
            id: item.id.to_string(),
            order_id: order_id.to_string(),
            name: item.name.clone(),
            price: item.unit_price.cents(),
            quantity,
            product_id: item.product_id.to_string(),
            position,
        })
    }

    /// Builds one row per item of `order`, in item order.
    pub fn all_from_order(order: &Order) -> Result<Vec<Self>> {
        order
            .items()
            .iter()
            .enumerate()
            .map(|(position, item)| Self::from_item(order.id(), position, item))
            .collect()
    }

    fn into_item(self) -> Result<OrderItem> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::InvalidRow(format!(
                "item {} has negative quantity {}",
                self.id, self.quantity
            ))
        })?;

        Ok(OrderItem::new(
            ItemId::new(self.id),
            self.name,
            Money::from_cents(self.price),
            ProductId::new(self.product_id),
            quantity,
        ))
    }
}

/// Rebuilds an order from its header and item rows.
///
/// Items are ordered by `position`. Fails with
/// [`RepositoryError::TotalMismatch`] if the stored total disagrees with the
/// stored items.
pub fn rebuild_order(header: OrderRow, mut items: Vec<OrderItemRow>) -> Result<Order> {
    items.sort_by_key(|row| row.position);
    let items = items
        .into_iter()
        .map(OrderItemRow::into_item)
        .collect::<Result<Vec<_>>>()?;

    let order_id = OrderId::new(header.id);
    let order = Order::new(order_id.clone(), CustomerId::new(header.customer_id), items)
        .map_err(|e| RepositoryError::InvalidRow(format!("order {order_id}: {e}")))?;

    let stored = Money::from_cents(header.total);
    let computed = order.total();
    if stored != computed {
        return Err(RepositoryError::TotalMismatch {
            order_id,
            stored,
            computed,
        });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order::new(
            "o1",
            "c1",
            vec![
                OrderItem::new("i1", "item1", Money::from_dollars(10), "p1", 1),
                OrderItem::new("i2", "item2", Money::from_dollars(20), "p2", 2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn header_row_carries_computed_total() {
        let row = OrderRow::from_order(&sample_order());
        assert_eq!(row.id, "o1");
        assert_eq!(row.customer_id, "c1");
        assert_eq!(row.total, 5000);
    }

    #[test]
    fn item_rows_reference_parent_and_position() {
        let rows = OrderItemRow::all_from_order(&sample_order()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.order_id == "o1"));
        assert_eq!(rows[1].id, "i2");
        assert_eq!(rows[1].position, 1);
        assert_eq!(rows[1].price, 2000);
    }

    #[test]
    fn rebuild_sorts_items_by_position() {
        let order = sample_order();
        let header = OrderRow::from_order(&order);
        let mut items = OrderItemRow::all_from_order(&order).unwrap();
        items.reverse();

        let rebuilt = rebuild_order(header, items).unwrap();
        assert_eq!(rebuilt, order);
    }

    #[test]
    fn rebuild_detects_total_mismatch() {
        let order = sample_order();
        let mut header = OrderRow::from_order(&order);
        header.total += 1;
        let items = OrderItemRow::all_from_order(&order).unwrap();

        let err = rebuild_order(header, items).unwrap_err();
        assert!(matches!(err, RepositoryError::TotalMismatch { .. }));
    }

    #[test]
    fn rebuild_rejects_negative_quantity() {
        let order = sample_order();
        let header = OrderRow::from_order(&order);
        let mut items = OrderItemRow::all_from_order(&order).unwrap();
        items[0].quantity = -1;

        let err = rebuild_order(header, items).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRow(_)));
    }

    #[test]
    fn rebuild_rejects_rows_whose_total_overflows() {
        let header = OrderRow {
            id: "o1".to_string(),
            customer_id: "c1".to_string(),
            total: 0,
        };
        let items = vec![OrderItemRow {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            name: "big".to_string(),
            price: i64::MAX / 2 + 1,
            quantity: 2,
            product_id: "p1".to_string(),
            position: 0,
        }];

        let err = rebuild_order(header, items).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRow(_)));
    }
}
