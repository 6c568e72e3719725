//! Storage seam
//!
//! Persistence for users, events and bookings. Every mutating method is a
//! single atomic unit: the new state and its audit entries are committed
//! together or not at all. Capacity decisions are made by the aggregates
//! while the backend holds the event exclusively.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::{Booking, Event, EventCommand, User};
use crate::audit::AuditEntry;
use crate::domain::{EventLifecycle, OperationContext, SeatList};
use crate::error::AppResult;

/// Restriction applied to booking listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingScope {
    pub user_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
}

impl BookingScope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            event_id: None,
        }
    }

    pub fn with_event(mut self, event_id: Uuid) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        self.user_id.map_or(true, |id| booking.user_id() == id)
            && self.event_id.map_or(true, |id| booking.event_id() == id)
    }
}

/// Active booking joined with the names used by search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub user_name: String,
    pub event_title: String,
}

/// Storage backend
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    // Users

    /// Insert a new user. Clashing email → validation error.
    async fn insert_user(&self, user: &User, context: &OperationContext) -> AppResult<()>;

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>>;

    // Events

    async fn insert_event(
        &self,
        event: &Event,
        change: &EventLifecycle,
        context: &OperationContext,
    ) -> AppResult<()>;

    async fn get_event(&self, event_id: Uuid) -> AppResult<Option<Event>>;

    /// Decide and apply an administrator command while holding the event.
    /// Returns the resulting state (unchanged for a no-op).
    async fn apply_event_command(
        &self,
        event_id: Uuid,
        command: &EventCommand,
        context: &OperationContext,
    ) -> AppResult<Event>;

    /// Events that are not soft-deleted, by date, time, creation
    async fn list_active_events(&self) -> AppResult<Vec<Event>>;

    // Bookings

    /// Reserve capacity, check seat disjointness and insert the booking in one step
    async fn commit_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        event_id: Uuid,
        seats: SeatList,
        context: &OperationContext,
    ) -> AppResult<Booking>;

    /// Cancel and release capacity in one step. Already cancelled → unchanged.
    async fn cancel_booking(&self, booking_id: Uuid, context: &OperationContext)
        -> AppResult<Booking>;

    async fn get_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>>;

    /// Active bookings in scope, by creation
    async fn list_bookings(&self, scope: BookingScope) -> AppResult<Vec<BookingView>>;

    // Audit

    async fn audit_trail(&self, aggregate_id: Uuid) -> AppResult<Vec<AuditEntry>>;
}
