//! Shipment service providing the packing reconciliation workflow.

use common::ShipmentId;
use history::{HistoryEntry, HistoryStore};

use crate::aggregate::Aggregate;
use crate::command::{CommandHandler, CommandResult};
use crate::error::{DomainError, StorageError};

use super::{
    CreateShipment, ResetShipment, Shipment, ShipmentRepository, UpdateContents,
    UpdateInstructions, UpdatePacking,
};

const DUPLICATE_SHIPMENT: &str = "Shipment with this ID already exists";

/// Service for managing shipments.
///
/// Wraps the command handler and exposes one method per workflow
/// operation.
#[derive(Clone)]
pub struct ShipmentService<R, H> {
    handler: CommandHandler<R, H>,
}

impl<R, H> ShipmentService<R, H>
where
    R: ShipmentRepository,
    H: HistoryStore,
{
    /// Creates a new shipment service.
    pub fn new(repository: R, history: H) -> Self {
        Self {
            handler: CommandHandler::new(repository, history),
        }
    }

    /// Validates and stores a new shipment.
    ///
    /// The original contents snapshot is taken here and never written again.
    #[tracing::instrument(skip(self, cmd), fields(shipment_id = %cmd.shipment_id.trim()))]
    pub async fn create_shipment(&self, cmd: CreateShipment) -> Result<Shipment, DomainError> {
        let mut shipment = Shipment::default();
        let events = shipment.create(cmd)?;
        shipment.apply_events(events.iter().cloned());

        let repository = self.handler.repository();
        if repository.find(shipment.shipment_id()).await?.is_some() {
            return Err(DomainError::Conflict(DUPLICATE_SHIPMENT.to_string()));
        }

        let shipment = repository.insert(shipment).await.map_err(|e| match e {
            StorageError::DuplicateKey(_) => DomainError::Conflict(DUPLICATE_SHIPMENT.to_string()),
            other => other.into(),
        })?;

        for event in &events {
            self.handler.record(shipment.shipment_id(), event).await;
        }

        metrics::counter!("shipments_created_total").increment(1);
        tracing::info!(
            shipment_id = %shipment.shipment_id(),
            items = shipment.contents().len(),
            "shipment created"
        );

        Ok(shipment)
    }

    /// Returns a shipment by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_shipment(&self, shipment_id: &ShipmentId) -> Result<Shipment, DomainError> {
        self.handler.load(shipment_id).await
    }

    /// Returns all shipments, priority shipments first.
    #[tracing::instrument(skip(self))]
    pub async fn list_shipments(&self) -> Result<Vec<Shipment>, DomainError> {
        Ok(self.handler.repository().list().await?)
    }

    /// Replaces packing lines and/or sets the status.
    #[tracing::instrument(skip(self, cmd), fields(shipment_id = %cmd.shipment_id))]
    pub async fn update_packing(&self, cmd: UpdatePacking) -> Result<CommandResult, DomainError> {
        let UpdatePacking {
            shipment_id,
            packing_lines,
            status,
        } = cmd;

        self.handler
            .execute(&shipment_id, "update_packing", |shipment| {
                shipment.update_packing(packing_lines, status.as_deref())
            })
            .await
    }

    /// Applies quantity updates, then additions, and persists once.
    ///
    /// Each item's history entry is written as soon as the item is
    /// accepted. If a later item fails, entries already written stay in
    /// the log and nothing is persisted.
    #[tracing::instrument(
        skip(self, cmd),
        fields(
            shipment_id = %cmd.shipment_id,
            updates = cmd.updates.len(),
            additions = cmd.additions.len(),
        )
    )]
    pub async fn update_contents(&self, cmd: UpdateContents) -> Result<CommandResult, DomainError> {
        let mut shipment = self.handler.load(&cmd.shipment_id).await?;
        let mut applied = Vec::new();

        for update in &cmd.updates {
            let events = shipment.update_quantity(&update.sku, update.new_quantity)?;
            self.handler.apply_and_record(&mut shipment, &events).await;
            applied.extend(events);
        }

        for line in cmd.additions {
            let events = shipment.add_content_line(line)?;
            self.handler.apply_and_record(&mut shipment, &events).await;
            applied.extend(events);
        }

        if applied.is_empty() {
            return Ok(CommandResult {
                shipment,
                events: applied,
            });
        }

        let shipment = self.handler.persist(shipment).await?;
        metrics::counter!("shipment_commands_total", "command" => "update_contents").increment(1);

        Ok(CommandResult {
            shipment,
            events: applied,
        })
    }

    /// Restores the original contents and clears packing.
    #[tracing::instrument(skip(self, cmd), fields(shipment_id = %cmd.shipment_id))]
    pub async fn reset_shipment(&self, cmd: ResetShipment) -> Result<CommandResult, DomainError> {
        self.handler
            .execute(&cmd.shipment_id, "reset", |shipment| shipment.reset())
            .await
    }

    /// Sets the packing instructions.
    #[tracing::instrument(skip(self, cmd), fields(shipment_id = %cmd.shipment_id))]
    pub async fn update_instructions(
        &self,
        cmd: UpdateInstructions,
    ) -> Result<CommandResult, DomainError> {
        self.handler
            .execute(&cmd.shipment_id, "update_instructions", |shipment| {
                shipment.update_instructions(&cmd.packing_instructions)
            })
            .await
    }

    /// Returns the shipment's history, newest first.
    ///
    /// Reads the log for any ID; an unknown shipment simply has no entries.
    #[tracing::instrument(skip(self))]
    pub async fn history(&self, shipment_id: &ShipmentId) -> Result<Vec<HistoryEntry>, DomainError> {
        Ok(self
            .handler
            .recorder()
            .store()
            .list_for_shipment(shipment_id)
            .await?)
    }
}
