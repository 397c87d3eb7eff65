use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{StorageError, is_unique_violation};

use super::{Product, ProductPage, ProductQuery, ProductRepository};

/// PostgreSQL-backed product repository.
#[derive(Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_product(row: PgRow) -> Result<Product, StorageError> {
        let document: serde_json::Value = row.try_get("document")?;
        Ok(serde_json::from_value(document)?)
    }
}

/// Builds an ILIKE pattern matching `search` literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const SEARCH_FILTER: &str = r#"
    ($1::TEXT IS NULL
     OR sku ILIKE $1
     OR asin ILIKE $1
     OR document->>'productName' ILIKE $1
     OR document->'description'->>'short' ILIKE $1
     OR document->'description'->>'long' ILIKE $1)
"#;

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn insert(&self, product: Product) -> Result<Product, StorageError> {
        let document = serde_json::to_value(&product)?;

        sqlx::query(
            r#"
            INSERT INTO products (sku, asin, document, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&product.sku)
        .bind(&product.asin)
        .bind(&document)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::DuplicateKey(product.sku.clone())
            } else {
                StorageError::Database(e)
            }
        })?;

        Ok(product)
    }

    async fn exists(&self, sku: &str, asin: &str) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM products WHERE sku = $1 OR asin = $2)",
        )
        .bind(sku)
        .bind(asin)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list(&self, query: &ProductQuery) -> Result<ProductPage, StorageError> {
        let pattern = query.search().map(like_pattern);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products WHERE {SEARCH_FILTER}"))
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(&format!(
            "SELECT document FROM products WHERE {SEARCH_FILTER} \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(i64::from(query.limit()))
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_product)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductPage::new(items, total.max(0) as u64, query))
    }
}
