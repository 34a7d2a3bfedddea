//! PostgreSQL integration tests
//!
//! These tests share one PostgreSQL container; every test gets its own
//! freshly migrated database, so they can run in parallel.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration
//! ```

use std::sync::Arc;

use common::{CustomerId, OrderId};
use domain::{Money, Order, OrderItem};
use order_store::{
    OrderRepository, OrderRepositoryExt, PostgresOrderRepository, RepositoryError, StoreConfig,
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    base_url: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            Arc::new(ContainerInfo {
                container,
                base_url: format!("postgres://postgres:postgres@{}:{}", host, port),
            })
        })
        .await
        .clone()
}

/// Get a repository backed by a new, migrated database
async fn get_test_repository() -> PostgresOrderRepository {
    let info = get_container_info().await;
    let database = format!("orders_{}", uuid::Uuid::new_v4().simple());

    let admin = PgPool::connect(&format!("{}/postgres", info.base_url))
        .await
        .unwrap();
    sqlx::query(&format!("CREATE DATABASE {database}"))
        .execute(&admin)
        .await
        .unwrap();
    admin.close().await;

    let config = StoreConfig::default().with_database_url(format!("{}/{database}", info.base_url));
    let repo = PostgresOrderRepository::connect(&config).await.unwrap();
    repo.run_migrations().await.unwrap();
    repo
}

fn item(id: &str, name: &str, dollars: i64, product: &str, quantity: u32) -> OrderItem {
    OrderItem::new(id, name, Money::from_dollars(dollars), product, quantity)
}

#[tokio::test]
async fn create_persists_header_and_items() {
    let repo = get_test_repository().await;
    let order = Order::new("123", "123", vec![item("1", "Product 1", 10, "123", 2)]).unwrap();

    repo.create(&order).await.unwrap();

    let (customer_id, total): (String, i64) =
        sqlx::query_as("SELECT customer_id, total FROM orders WHERE id = '123'")
            .fetch_one(repo.pool())
            .await
            .unwrap();
    assert_eq!(customer_id, "123");
    assert_eq!(total, order.total().cents());

    let items: Vec<(String, String, i64, i32, String, String)> = sqlx::query_as(
        "SELECT id, name, price, quantity, order_id, product_id FROM order_items",
    )
    .fetch_all(repo.pool())
    .await
    .unwrap();
    assert_eq!(
        items,
        vec![(
            "1".to_string(),
            "Product 1".to_string(),
            1000,
            2,
            "123".to_string(),
            "123".to_string()
        )]
    );
}

#[tokio::test]
async fn create_duplicate_id_conflicts() {
    let repo = get_test_repository().await;
    let order = Order::new("o1", "c1", vec![item("i1", "item1", 10, "p1", 1)]).unwrap();
    repo.create(&order).await.unwrap();

    let duplicate = Order::new("o1", "c1", vec![item("i2", "item2", 10, "p1", 1)]).unwrap();
    let err = repo.create(&duplicate).await.unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(repo.find(order.id()).await.unwrap(), order);
}

#[tokio::test]
async fn find_returns_the_created_order() {
    let repo = get_test_repository().await;
    let order = Order::new(
        "abc123",
        "c1",
        vec![
            item("o1", "item1", 10, "p1", 1),
            item("o2", "item2", 20, "p2", 2),
        ],
    )
    .unwrap();

    repo.create(&order).await.unwrap();

    assert_eq!(repo.find(&OrderId::new("abc123")).await.unwrap(), order);
}

#[tokio::test]
async fn find_missing_order_is_not_found() {
    let repo = get_test_repository().await;

    let err = repo.find(&OrderId::new("12321")).await.unwrap_err();

    assert!(err.is_not_found());
    assert!(!repo.exists(&OrderId::new("12321")).await.unwrap());
}

#[tokio::test]
async fn find_all_returns_every_order() {
    let repo = get_test_repository().await;
    let order1 = Order::new("abc123", "c1", vec![item("o1", "item1", 10, "p1", 1)]).unwrap();
    let order2 = Order::new("4441", "c1", vec![item("o2", "item2", 20, "p2", 2)]).unwrap();
    repo.create(&order1).await.unwrap();
    repo.create(&order2).await.unwrap();

    let orders = repo.find_all().await.unwrap();

    assert_eq!(orders.len(), 2);
    assert!(orders.contains(&order1));
    assert!(orders.contains(&order2));
}

#[tokio::test]
async fn update_reconciles_added_item() {
    let repo = get_test_repository().await;
    let mut order = Order::new(
        OrderId::generate(),
        CustomerId::generate(),
        vec![item(&uuid::Uuid::new_v4().to_string(), "Product 1", 10, "p1", 2)],
    )
    .unwrap();
    repo.create(&order).await.unwrap();

    order
        .add_item(item(&uuid::Uuid::new_v4().to_string(), "Product 2", 20, "p2", 2))
        .unwrap();
    repo.update(&order).await.unwrap();
    let found = repo.find(order.id()).await.unwrap();

    assert_eq!(found.total(), order.total());
    assert_eq!(found.total(), Money::from_dollars(60));
    assert_eq!(found.item_count(), 2);
    assert_eq!(found, order);
}

#[tokio::test]
async fn failed_update_rolls_back() {
    let repo = get_test_repository().await;
    let order = Order::new("o1", "c1", vec![item("a", "A", 10, "p1", 1)]).unwrap();
    let other = Order::new("o2", "c1", vec![item("b", "B", 20, "p2", 1)]).unwrap();
    repo.create(&order).await.unwrap();
    repo.create(&other).await.unwrap();

    // Item "b" already belongs to o2: the insert step fails after the delete.
    let mut changed = order.clone();
    changed.add_item(item("b", "B", 20, "p2", 1)).unwrap();
    let err = repo.update(&changed).await.unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(repo.find(order.id()).await.unwrap(), order);
}

#[tokio::test]
async fn update_missing_order_is_not_found() {
    let repo = get_test_repository().await;
    let ghost = Order::new("ghost", "c1", vec![item("a", "A", 10, "p1", 1)]).unwrap();

    let err = repo.update(&ghost).await.unwrap_err();

    assert!(err.is_not_found());
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_items")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn tampered_total_is_reported() {
    let repo = get_test_repository().await;
    let order = Order::new("o1", "c1", vec![item("a", "A", 10, "p1", 1)]).unwrap();
    repo.create(&order).await.unwrap();

    sqlx::query("UPDATE orders SET total = 1 WHERE id = 'o1'")
        .execute(repo.pool())
        .await
        .unwrap();

    let err = repo.find(order.id()).await.unwrap_err();
    assert!(matches!(err, RepositoryError::TotalMismatch { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reads_stay_consistent_while_updates_commit() {
    let repo = get_test_repository().await;
    let small = Order::new("o1", "c1", vec![item("a", "Product A", 10, "p1", 2)]).unwrap();
    let mut large = small.clone();
    large.add_item(item("b", "Product B", 20, "p2", 2)).unwrap();
    repo.create(&small).await.unwrap();

    let writer = {
        let repo = repo.clone();
        let (small, large) = (small.clone(), large.clone());
        tokio::spawn(async move {
            for round in 0..100 {
                let next = if round % 2 == 0 { &large } else { &small };
                repo.update(next).await.unwrap();
            }
        })
    };

    while !writer.is_finished() {
        let found = repo.find(small.id()).await.unwrap();
        assert!(found == small || found == large, "torn read: {found:?}");

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }
    writer.await.unwrap();
}
