use async_trait::async_trait;
use common::ShipmentId;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{EntryId, HistoryEntry, HistoryStore, Result};

/// Runs the embedded workspace migrations against the pool.
///
/// Creates the history, shipment and product tables.
pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// PostgreSQL-backed history store.
#[derive(Clone)]
pub struct PostgresHistoryStore {
    pool: PgPool,
}

impl PostgresHistoryStore {
    /// Creates a new PostgreSQL history store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_entry(row: PgRow) -> Result<HistoryEntry> {
        Ok(HistoryEntry {
            id: EntryId::from_uuid(row.try_get::<Uuid, _>("id")?),
            shipment_id: ShipmentId::new(row.try_get::<String, _>("shipment_id")?),
            event: row.try_get("event")?,
            meta: row.try_get("meta")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl HistoryStore for PostgresHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO shipment_history (id, shipment_id, event, meta, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.shipment_id.as_str())
        .bind(&entry.event)
        .bind(&entry.meta)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_shipment(&self, shipment_id: &ShipmentId) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, shipment_id, event, meta, created_at
            FROM shipment_history
            WHERE shipment_id = $1
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(shipment_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }
}
