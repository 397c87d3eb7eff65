use async_trait::async_trait;
use common::ShipmentId;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{StorageError, is_unique_violation};

use super::{Shipment, ShipmentRepository};

/// PostgreSQL-backed shipment repository.
///
/// The whole shipment is kept as one JSONB document; sort keys and the
/// revision live in their own columns.
#[derive(Clone)]
pub struct PostgresShipmentRepository {
    pool: PgPool,
}

impl PostgresShipmentRepository {
    /// Creates a new PostgreSQL shipment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_shipment(row: PgRow) -> Result<Shipment, StorageError> {
        let document: serde_json::Value = row.try_get("document")?;
        let mut shipment: Shipment = serde_json::from_value(document)?;
        shipment.set_revision(row.try_get("revision")?);
        Ok(shipment)
    }

    async fn current_revision(&self, shipment_id: &ShipmentId) -> Result<Option<i64>, StorageError> {
        let revision =
            sqlx::query_scalar("SELECT revision FROM shipments WHERE shipment_id = $1")
                .bind(shipment_id.as_str())
                .fetch_optional(&self.pool)
                .await?;
        Ok(revision)
    }
}

#[async_trait]
impl ShipmentRepository for PostgresShipmentRepository {
    async fn insert(&self, mut shipment: Shipment) -> Result<Shipment, StorageError> {
        shipment.set_revision(0);
        let document = serde_json::to_value(&shipment)?;

        sqlx::query(
            r#"
            INSERT INTO shipments
                (shipment_id, document, revision, is_priority, priority_index, created_at, updated_at)
            VALUES ($1, $2, 0, $3, $4, $5, $6)
            "#,
        )
        .bind(shipment.shipment_id().as_str())
        .bind(&document)
        .bind(shipment.is_priority())
        .bind(shipment.priority_index())
        .bind(shipment.created_at())
        .bind(shipment.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::DuplicateKey(shipment.shipment_id().to_string())
            } else {
                StorageError::Database(e)
            }
        })?;

        Ok(shipment)
    }

    async fn find(&self, shipment_id: &ShipmentId) -> Result<Option<Shipment>, StorageError> {
        let row = sqlx::query("SELECT document, revision FROM shipments WHERE shipment_id = $1")
            .bind(shipment_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_shipment).transpose()
    }

    async fn update(&self, mut shipment: Shipment) -> Result<Shipment, StorageError> {
        let expected = shipment.revision();
        shipment.set_revision(expected + 1);
        let document = serde_json::to_value(&shipment)?;

        let result = sqlx::query(
            r#"
            UPDATE shipments
            SET document = $2, revision = $3, is_priority = $4, priority_index = $5, updated_at = $6
            WHERE shipment_id = $1 AND revision = $7
            "#,
        )
        .bind(shipment.shipment_id().as_str())
        .bind(&document)
        .bind(expected + 1)
        .bind(shipment.is_priority())
        .bind(shipment.priority_index())
        .bind(shipment.updated_at())
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let shipment_id = shipment.shipment_id().clone();
            return match self.current_revision(&shipment_id).await? {
                Some(actual) => Err(StorageError::RevisionConflict {
                    shipment_id,
                    expected,
                    actual: Some(actual),
                }),
                None => Err(StorageError::Missing(shipment_id.to_string())),
            };
        }

        Ok(shipment)
    }

    async fn list(&self) -> Result<Vec<Shipment>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT document, revision
            FROM shipments
            ORDER BY is_priority DESC, priority_index ASC NULLS LAST, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_shipment).collect()
    }
}
