//! Booking Ledger
//!
//! Opens and closes bookings. Each command is one atomic unit in the store:
//! capacity, seat disjointness and the booking record change together.

use std::sync::Arc;

use uuid::Uuid;

use crate::aggregate::{Aggregate, Booking};
use crate::domain::{DomainError, OperationContext, Resource, SeatList};
use crate::error::AppResult;
use crate::store::{BookingScope, Store};

use super::CreateBookingCommand;

/// Handler for booking lifecycle commands
#[derive(Clone)]
pub struct BookingLedger {
    store: Arc<dyn Store>,
}

impl BookingLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Book seats for a user. The caller must be that user or an admin.
    pub async fn create_booking(
        &self,
        command: CreateBookingCommand,
        context: &OperationContext,
    ) -> AppResult<Booking> {
        context.require_owner_or_admin(command.user_id)?;

        let seats = SeatList::new(&command.seats)?;

        if self.store.get_user(command.user_id).await?.is_none() {
            return Err(DomainError::not_found(Resource::User, command.user_id).into());
        }

        let result = self
            .store
            .commit_booking(
                Uuid::new_v4(),
                command.user_id,
                command.event_id,
                seats,
                context,
            )
            .await;

        match &result {
            Ok(booking) => tracing::info!(
                booking_id = %booking.id(),
                event_id = %booking.event_id(),
                seats = booking.seats().count(),
                price = %booking.price(),
                "Booking created"
            ),
            Err(e) => tracing::debug!(
                event_id = %command.event_id,
                error = %e,
                "Booking rejected"
            ),
        }

        result
    }

    /// Cancel a booking and release its seats. Repeating it is a no-op.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        context: &OperationContext,
    ) -> AppResult<()> {
        context.require_caller()?;

        let booking = self.get_booking(booking_id, context).await?;
        if booking.is_cancelled() {
            tracing::debug!(booking_id = %booking_id, "Booking already cancelled");
            return Ok(());
        }

        let booking = self.store.cancel_booking(booking_id, context).await?;

        tracing::info!(
            booking_id = %booking_id,
            event_id = %booking.event_id(),
            "Booking cancelled"
        );
        Ok(())
    }

    /// Any booking by id, including cancelled ones. Owner or admin only.
    pub async fn get_booking(
        &self,
        booking_id: Uuid,
        context: &OperationContext,
    ) -> AppResult<Booking> {
        context.require_caller()?;

        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or(DomainError::not_found(Resource::Booking, booking_id))?;

        context.require_owner_or_admin(booking.user_id())?;
        Ok(booking)
    }

    /// Active bookings owned by `user_id`, oldest first
    pub async fn list_bookings_for_user(
        &self,
        user_id: Uuid,
        context: &OperationContext,
    ) -> AppResult<Vec<Booking>> {
        context.require_owner_or_admin(user_id)?;

        let views = self.store.list_bookings(BookingScope::for_user(user_id)).await?;
        Ok(views.into_iter().map(|view| view.booking).collect())
    }
}
