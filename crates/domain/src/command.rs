//! Command handling infrastructure.
//!
//! Every shipment mutation follows the same path: load the document, let
//! the aggregate turn the command into events, apply each event and write
//! its history entry, then persist the document with a revision check.

use chrono::Utc;
use common::ShipmentId;
use history::{HistoryEntry, HistoryRecorder, HistoryStore};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;
use crate::shipment::{Shipment, ShipmentError, ShipmentEvent, ShipmentRepository};

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// The shipment as persisted after the command.
    pub shipment: Shipment,

    /// The events that were applied and recorded.
    pub events: Vec<ShipmentEvent>,
}

/// Handler for executing commands against shipments.
#[derive(Clone)]
pub struct CommandHandler<R, H> {
    repository: R,
    recorder: HistoryRecorder<H>,
}

impl<R, H> CommandHandler<R, H>
where
    R: ShipmentRepository,
    H: HistoryStore,
{
    /// Creates a new command handler.
    pub fn new(repository: R, history: H) -> Self {
        Self {
            repository,
            recorder: HistoryRecorder::new(history),
        }
    }

    /// Returns a reference to the shipment repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the history recorder.
    pub fn recorder(&self) -> &HistoryRecorder<H> {
        &self.recorder
    }

    /// Loads a shipment, failing with not-found if it does not exist.
    pub async fn load(&self, shipment_id: &ShipmentId) -> Result<Shipment, DomainError> {
        self.repository
            .find(shipment_id)
            .await?
            .ok_or_else(|| DomainError::ShipmentNotFound(shipment_id.clone()))
    }

    /// Executes a command against a stored shipment.
    ///
    /// When the command yields no events the shipment is returned as loaded
    /// and nothing is written.
    pub async fn execute<F>(
        &self,
        shipment_id: &ShipmentId,
        command: &'static str,
        command_fn: F,
    ) -> Result<CommandResult, DomainError>
    where
        F: FnOnce(&Shipment) -> Result<Vec<ShipmentEvent>, ShipmentError>,
    {
        let mut shipment = self.load(shipment_id).await?;
        let events = command_fn(&shipment)?;

        if events.is_empty() {
            return Ok(CommandResult {
                shipment,
                events,
            });
        }

        self.apply_and_record(&mut shipment, &events).await;
        let shipment = self.persist(shipment).await?;

        metrics::counter!("shipment_commands_total", "command" => command).increment(1);

        Ok(CommandResult { shipment, events })
    }

    /// Applies events in order, writing one history entry per event.
    pub async fn apply_and_record(&self, shipment: &mut Shipment, events: &[ShipmentEvent]) {
        for event in events {
            shipment.apply(event.clone());
            self.record(shipment.shipment_id(), event).await;
        }
    }

    /// Writes the history entry for one event.
    pub async fn record(&self, shipment_id: &ShipmentId, event: &ShipmentEvent) {
        tracing::debug!(
            %shipment_id,
            event_type = event.event_type(),
            "recording shipment event"
        );
        self.recorder
            .record_entry(HistoryEntry::new(
                shipment_id.clone(),
                event.history_name(),
                event.history_meta(),
            ))
            .await;
    }

    /// Stamps the modification time and stores the shipment.
    pub async fn persist(&self, mut shipment: Shipment) -> Result<Shipment, DomainError> {
        shipment.touch(Utc::now());
        Ok(self.repository.update(shipment).await?)
    }
}
