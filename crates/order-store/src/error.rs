use common::OrderId;
use domain::Money;
use thiserror::Error;

/// Errors that can occur when reading or writing orders.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No order header exists for the given ID.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The write collided with existing data (duplicate ID, unique or
    /// foreign-key violation).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The storage engine could not be reached.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The stored total does not match the stored items.
    #[error("Total mismatch for order {order_id}: stored {stored}, computed {computed}")]
    TotalMismatch {
        order_id: OrderId,
        stored: Money,
        computed: Money,
    },

    /// A stored row cannot be turned back into a valid order.
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Any other storage engine error.
    #[error("Storage error: {0}")]
    Storage(sqlx::Error),
}

impl RepositoryError {
    /// Returns true if this is a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return RepositoryError::Conflict(db_err.message().to_string());
        }

        if matches!(
            err,
            sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
        ) {
            return RepositoryError::StorageUnavailable(err.to_string());
        }

        RepositoryError::Storage(err)
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_unavailable() {
        let err = RepositoryError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, RepositoryError::StorageUnavailable(_)));

        let err = RepositoryError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, RepositoryError::StorageUnavailable(_)));
    }

    #[test]
    fn other_errors_pass_through() {
        let err = RepositoryError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Storage(sqlx::Error::RowNotFound)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_distinguishable() {
        let err = RepositoryError::NotFound(OrderId::new("missing"));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Order not found: missing");
    }
}
