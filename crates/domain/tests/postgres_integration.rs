//! PostgreSQL integration tests for the shipment and product repositories.
//!
//! Run with:
//!
//! ```bash
//! cargo test -p domain --test postgres_integration
//! ```

use std::sync::Arc;

use domain::{
    ContentLine, CreateShipment, ErrorKind, NewProduct, PostgresProductRepository,
    PostgresShipmentRepository, ProductCatalog, ProductQuery, QuantityUpdate, ShipmentRepository,
    ShipmentService, StorageError, UpdateContents,
};
use history::{PostgresHistoryStore, ShipmentId};
use serde_json::json;
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            history::run_migrations(&temp_pool).await.unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_pool() -> PgPool {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE shipments, shipment_history, products")
        .execute(&pool)
        .await
        .unwrap();

    pool
}

fn shipment_service(
    pool: &PgPool,
) -> ShipmentService<PostgresShipmentRepository, PostgresHistoryStore> {
    ShipmentService::new(
        PostgresShipmentRepository::new(pool.clone()),
        PostgresHistoryStore::new(pool.clone()),
    )
}

#[tokio::test]
#[serial]
async fn shipment_document_round_trip() {
    let pool = get_test_pool().await;
    let service = shipment_service(&pool);

    let created = service
        .create_shipment(
            CreateShipment::new("PG-1", "Postgres", vec![ContentLine::new("A", "X", 10)])
                .with_priority(3),
        )
        .await
        .unwrap();

    let loaded = service.get_shipment(created.shipment_id()).await.unwrap();
    assert_eq!(loaded.shipment_name(), "Postgres");
    assert_eq!(loaded.priority_index(), Some(3));
    assert_eq!(loaded.original_contents(), loaded.contents());
    assert_eq!(loaded.revision(), 0);
}

#[tokio::test]
#[serial]
async fn update_contents_persists_and_logs() {
    let pool = get_test_pool().await;
    let service = shipment_service(&pool);
    let id = ShipmentId::from("PG-2");

    service
        .create_shipment(CreateShipment::new(
            id.as_str(),
            "Postgres",
            vec![ContentLine::new("A", "X", 10)],
        ))
        .await
        .unwrap();

    let result = service
        .update_contents(UpdateContents::new(
            id.clone(),
            vec![QuantityUpdate::new("A", 4)],
            vec![],
        ))
        .await
        .unwrap();
    assert_eq!(result.shipment.revision(), 1);

    let loaded = service.get_shipment(&id).await.unwrap();
    assert_eq!(loaded.content_line("A").unwrap().quantity, 4);

    let history = service.history(&id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event, "Quantity Updated");
}

#[tokio::test]
#[serial]
async fn duplicate_shipment_conflicts() {
    let pool = get_test_pool().await;
    let service = shipment_service(&pool);

    let cmd = || CreateShipment::new("PG-3", "Dup", vec![ContentLine::new("A", "X", 1)]);
    service.create_shipment(cmd()).await.unwrap();
    let err = service.create_shipment(cmd()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
#[serial]
async fn stale_revision_is_rejected() {
    let pool = get_test_pool().await;
    let repository = PostgresShipmentRepository::new(pool.clone());
    let service = shipment_service(&pool);

    let created = service
        .create_shipment(CreateShipment::new(
            "PG-4",
            "Race",
            vec![ContentLine::new("A", "X", 1)],
        ))
        .await
        .unwrap();

    repository.update(created.clone()).await.unwrap();
    let err = repository.update(created).await.unwrap_err();

    assert!(matches!(
        err,
        StorageError::RevisionConflict {
            expected: 0,
            actual: Some(1),
            ..
        }
    ));
}

#[tokio::test]
#[serial]
async fn listing_order_in_sql() {
    let pool = get_test_pool().await;
    let service = shipment_service(&pool);

    for (id, priority) in [("plain", None), ("p2", Some(2)), ("p1", Some(1))] {
        let mut cmd = CreateShipment::new(id, id, vec![ContentLine::new("A", "X", 1)]);
        if let Some(index) = priority {
            cmd = cmd.with_priority(index);
        }
        service.create_shipment(cmd).await.unwrap();
    }

    let ids: Vec<_> = service
        .list_shipments()
        .await
        .unwrap()
        .iter()
        .map(|s| s.shipment_id().to_string())
        .collect();
    assert_eq!(ids, vec!["p1", "p2", "plain"]);
}

#[tokio::test]
#[serial]
async fn product_catalog_search_and_conflicts() {
    let pool = get_test_pool().await;
    let catalog = ProductCatalog::new(PostgresProductRepository::new(pool));

    let product = |sku: &str, asin: &str, name: &str| -> NewProduct {
        serde_json::from_value(json!({
            "sku": sku,
            "asin": asin,
            "productName": name,
            "description": "100% cotton",
            "productWeight": 0.5,
            "length": 1, "width": 1, "height": 1
        }))
        .unwrap()
    };

    catalog.create_product(product("S1", "A1", "Shirt")).await.unwrap();
    catalog.create_product(product("S2", "A2", "Socks")).await.unwrap();

    let err = catalog
        .create_product(product("S3", "A1", "Scarf"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let page = catalog
        .list_products(ProductQuery {
            search: Some("sock".into()),
            ..ProductQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].sku, "S2");

    let literal = catalog
        .list_products(ProductQuery {
            search: Some("100%".into()),
            ..ProductQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(literal.total, 2);
}
