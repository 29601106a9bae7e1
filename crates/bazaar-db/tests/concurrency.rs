//! Concurrent settlements against a file database with several pooled
//! connections.

use std::path::PathBuf;
use std::time::Duration;

use bazaar_core::{CartLine, CoreError, ErrorKind, NewAddress, NewProduct, ProductId, SettlementRequest};
use bazaar_db::{Database, DbConfig, DbError, OrderError};

/// Removes the database file and its WAL side files when dropped.
struct ScratchDb {
    path: PathBuf,
}

impl ScratchDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("bazaar-test-{}.db", uuid::Uuid::new_v4()));
        ScratchDb { path }
    }
}

impl Drop for ScratchDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

async fn open(scratch: &ScratchDb, max_connections: u32, busy_timeout: Duration) -> Database {
    let config = DbConfig::new(&scratch.path)
        .max_connections(max_connections)
        .busy_timeout(busy_timeout);
    Database::new(config).await.unwrap()
}

async fn seed(db: &Database, stock: i64) -> (i64, ProductId) {
    let address = db
        .addresses()
        .insert(&NewAddress {
            user_id: 1,
            label: "Home".to_string(),
            recipient_name: "Sari".to_string(),
            phone: String::new(),
            detail: "Jl. Dago 12, Bandung".to_string(),
        })
        .await
        .unwrap();

    let product = db
        .products()
        .insert(&NewProduct {
            store_id: 1,
            category_id: 1,
            name: "Batik Tulis".to_string(),
            slug: "batik-tulis".to_string(),
            reseller_price_cents: 800,
            consumer_price_cents: 1000,
            stock,
            description: String::new(),
        })
        .await
        .unwrap();

    (address.id, product.id)
}

fn buy_one(address_id: i64, product_id: ProductId) -> SettlementRequest {
    SettlementRequest {
        buyer_id: 1,
        shipping_address_id: address_id,
        payment_method: "COD".to_string(),
        lines: vec![CartLine::new(product_id, 1)],
    }
}

async fn race(db: &Database, buyers: usize, address_id: i64, product_id: ProductId) -> Vec<Result<i64, OrderError>> {
    let handles: Vec<_> = (0..buyers)
        .map(|_| {
            let settlement = db.settlement();
            tokio::spawn(async move {
                settlement
                    .settle(buy_one(address_id, product_id))
                    .await
                    .map(|r| r.order_id)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(buyers);
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_last_unit_is_sold_once() {
    let scratch = ScratchDb::new();
    let db = open(&scratch, 4, Duration::from_secs(5)).await;
    let (address_id, product_id) = seed(&db, 1).await;

    let results = race(&db, 2, address_id, product_id).await;

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "{results:?}");

    let failure = results.into_iter().find_map(Result::err).unwrap();
    assert!(matches!(
        failure,
        OrderError::Rejected(CoreError::InsufficientStock {
            available: 0,
            requested: 1,
            ..
        })
    ));

    let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 0);
    assert_eq!(db.orders().count().await.unwrap(), 1);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_buyers_never_oversell() {
    let scratch = ScratchDb::new();
    let db = open(&scratch, 6, Duration::from_secs(10)).await;
    let (address_id, product_id) = seed(&db, 5).await;

    let results = race(&db, 10, address_id, product_id).await;

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 5, "{results:?}");
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.kind() == ErrorKind::InsufficientStock));

    let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 0);
    assert_eq!(db.orders().count().await.unwrap(), 5);

    let history = db.settlement().list_orders_for_user(1).await.unwrap();
    assert_eq!(history.len(), 5);
    assert!(history.iter().all(|o| o.lines_total() == o.order.total()));

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lock_wait_timeout_is_retryable() {
    let scratch = ScratchDb::new();
    let db = open(&scratch, 2, Duration::from_millis(100)).await;
    let (address_id, product_id) = seed(&db, 3).await;

    // Another writer holds the lock for the whole attempt
    let holder = db.pool().begin_with("BEGIN IMMEDIATE").await.unwrap();

    let err = db
        .settlement()
        .settle(buy_one(address_id, product_id))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::Persistence(DbError::Busy(_))), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(err.is_retryable());

    holder.rollback().await.unwrap();

    // Once the lock is free the same request goes through
    db.settlement()
        .settle(buy_one(address_id, product_id))
        .await
        .unwrap();
    let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 2);

    db.close().await;
}
