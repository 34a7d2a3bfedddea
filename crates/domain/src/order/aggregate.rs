//! Order aggregate implementation.

use common::{CustomerId, ItemId, OrderId};
use serde::{Deserialize, Serialize};

use super::{Money, OrderError, OrderItem};

/// Order aggregate root.
///
/// An order owns its line items. The total is always derived from the items
/// and is never stored on the aggregate; every constructor and mutation
/// rejects item sets whose total would overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: OrderId,

    /// Customer who placed the order.
    customer_id: CustomerId,

    /// Items in the order, in insertion order.
    items: Vec<OrderItem>,
}

impl Order {
    /// Creates an order, validating the header and every item.
    pub fn new(
        id: impl Into<OrderId>,
        customer_id: impl Into<CustomerId>,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        let order = Self {
            id: id.into(),
            customer_id: customer_id.into(),
            items,
        };
        order.validate()?;
        Ok(order)
    }

    fn validate(&self) -> Result<(), OrderError> {
        if self.id.is_blank() {
            return Err(OrderError::IdRequired);
        }
        if self.customer_id.is_blank() {
            return Err(OrderError::CustomerIdRequired);
        }
        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }
        for (index, item) in self.items.iter().enumerate() {
            validate_item(item)?;
            if self.items[..index].iter().any(|other| other.id == item.id) {
                return Err(OrderError::DuplicateItem {
                    item_id: item.id.clone(),
                });
            }
        }
        checked_total(&self.items).ok_or(OrderError::TotalOverflow)?;
        Ok(())
    }
}

fn checked_total(items: &[OrderItem]) -> Option<Money> {
    items.iter().try_fold(Money::zero(), |total, item| {
        total.checked_add(item.checked_total_price()?)
    })
}

fn validate_item(item: &OrderItem) -> Result<(), OrderError> {
    if item.quantity == 0 {
        return Err(OrderError::InvalidQuantity {
            item_id: item.id.clone(),
            quantity: item.quantity,
        });
    }
    if item.unit_price.is_negative() {
        return Err(OrderError::InvalidPrice {
            item_id: item.id.clone(),
            price: item.unit_price,
        });
    }
    Ok(())
}

// Query methods
impl Order {
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Returns the customer ID.
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns all items in the order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns an item by its ID.
    pub fn get_item(&self, item_id: &ItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    /// Returns the number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of unit price times quantity over all items.
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::total_price).sum()
    }
}

// Mutations
impl Order {
    /// Appends an item to the order.
    pub fn add_item(&mut self, item: OrderItem) -> Result<(), OrderError> {
        validate_item(&item)?;
        if self.get_item(&item.id).is_some() {
            return Err(OrderError::DuplicateItem { item_id: item.id });
        }
        item
            .checked_total_price()
            .and_then(|price| self.total().checked_add(price))
            .ok_or(OrderError::TotalOverflow)?;
        self.items.push(item);
        Ok(())
    }

    /// Removes an item from the order, returning it.
    ///
    /// The last item cannot be removed.
    pub fn remove_item(&mut self, item_id: &ItemId) -> Result<OrderItem, OrderError> {
        let index = self
            .items
            .iter()
            .position(|item| &item.id == item_id)
            .ok_or_else(|| OrderError::ItemNotFound {
                item_id: item_id.clone(),
            })?;
        if self.items.len() == 1 {
            return Err(OrderError::NoItems);
        }
        Ok(self.items.remove(index))
    }

    /// Changes the quantity of an existing item.
    pub fn update_item_quantity(
        &mut self,
        item_id: &ItemId,
        quantity: u32,
    ) -> Result<(), OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                item_id: item_id.clone(),
                quantity,
            });
        }
        let index = self
            .items
            .iter()
            .position(|item| &item.id == item_id)
            .ok_or_else(|| OrderError::ItemNotFound {
                item_id: item_id.clone(),
            })?;

        let previous = std::mem::replace(&mut self.items[index].quantity, quantity);
        if checked_total(&self.items).is_none() {
            self.items[index].quantity = previous;
            return Err(OrderError::TotalOverflow);
        }
        Ok(())
    }
}
