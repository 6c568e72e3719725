//! Event Registry
//!
//! Administrator commands over events. Capacity reservation is not exposed
//! here: it only happens inside the Booking Ledger's atomic units.

use std::sync::Arc;

use uuid::Uuid;

use crate::aggregate::{Aggregate, Event, EventCommand};
use crate::domain::{DomainError, EventChanges, EventDetails, OperationContext, Resource};
use crate::error::AppResult;
use crate::store::Store;

use super::{CreateEventCommand, UpdateEventCommand};

/// Handler for event lifecycle commands
#[derive(Clone)]
pub struct EventRegistry {
    store: Arc<dyn Store>,
}

impl EventRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Schedule a new event
    pub async fn create_event(
        &self,
        command: CreateEventCommand,
        context: &OperationContext,
    ) -> AppResult<Event> {
        context.require_admin()?;

        let details = EventDetails::parse(
            &command.title,
            &command.description,
            &command.date,
            &command.time,
            command.capacity,
            command.price,
        )?;

        let (event, change) = Event::create(Uuid::new_v4(), details);
        self.store.insert_event(&event, &change, context).await?;

        tracing::info!(
            event_id = %event.id(),
            capacity = event.capacity(),
            "Event created"
        );
        Ok(event)
    }

    /// Edit fields of a live event
    pub async fn update_event(
        &self,
        event_id: Uuid,
        command: UpdateEventCommand,
        context: &OperationContext,
    ) -> AppResult<Event> {
        context.require_admin()?;

        let changes = EventChanges::parse(
            command.title.as_deref(),
            command.description.as_deref(),
            command.date.as_deref(),
            command.time.as_deref(),
            command.capacity,
            command.price,
        )?;
        let fields = changes.changed_fields();

        let event = self
            .store
            .apply_event_command(event_id, &EventCommand::Update(changes), context)
            .await?;

        tracing::info!(event_id = %event_id, ?fields, "Event updated");
        Ok(event)
    }

    /// Withdraw an event from sale. Existing bookings stay as they are.
    pub async fn soft_delete_event(
        &self,
        event_id: Uuid,
        context: &OperationContext,
    ) -> AppResult<()> {
        context.require_admin()?;

        let event = self
            .store
            .apply_event_command(event_id, &EventCommand::SoftDelete, context)
            .await?;

        tracing::info!(
            event_id = %event_id,
            booked = event.booked_count(),
            "Event soft-deleted"
        );
        Ok(())
    }

    /// Any event by id, including soft-deleted ones
    pub async fn get_event(&self, event_id: Uuid) -> AppResult<Event> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Resource::Event, event_id).into())
    }
}
