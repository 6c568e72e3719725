//! Lifecycle changes
//!
//! Immutable records of every state change to events and bookings.
//! Aggregates apply them; stores append them to the audit log.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EventChanges, Price, SeatList};

/// Changes to an Event record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventLifecycle {
    /// Event was created by an administrator
    EventCreated {
        event_id: Uuid,
        title: String,
        description: String,
        date: NaiveDate,
        time: NaiveTime,
        capacity: u32,
        price: Price,
        created_at: DateTime<Utc>,
    },

    /// One or more fields were edited
    EventUpdated {
        event_id: Uuid,
        changes: EventChanges,
        updated_at: DateTime<Utc>,
    },

    /// Event was withdrawn from listings and booking
    EventSoftDeleted {
        event_id: Uuid,
        deleted_at: DateTime<Utc>,
    },

    /// Seats were counted against capacity for a booking
    CapacityReserved {
        event_id: Uuid,
        booking_id: Uuid,
        seats: u32,
        reserved_at: DateTime<Utc>,
    },

    /// Seats were returned to capacity after a cancellation
    CapacityReleased {
        event_id: Uuid,
        booking_id: Uuid,
        seats: u32,
        released_at: DateTime<Utc>,
    },
}

impl EventLifecycle {
    /// Get the change type as a string
    pub fn change_type(&self) -> &'static str {
        match self {
            EventLifecycle::EventCreated { .. } => "EventCreated",
            EventLifecycle::EventUpdated { .. } => "EventUpdated",
            EventLifecycle::EventSoftDeleted { .. } => "EventSoftDeleted",
            EventLifecycle::CapacityReserved { .. } => "CapacityReserved",
            EventLifecycle::CapacityReleased { .. } => "CapacityReleased",
        }
    }

    /// Get the event ID this change relates to
    pub fn event_id(&self) -> Uuid {
        match self {
            EventLifecycle::EventCreated { event_id, .. } => *event_id,
            EventLifecycle::EventUpdated { event_id, .. } => *event_id,
            EventLifecycle::EventSoftDeleted { event_id, .. } => *event_id,
            EventLifecycle::CapacityReserved { event_id, .. } => *event_id,
            EventLifecycle::CapacityReleased { event_id, .. } => *event_id,
        }
    }
}

/// Changes to a Booking record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BookingLifecycle {
    /// Seats were booked, with the total price fixed at this moment
    BookingCreated {
        booking_id: Uuid,
        user_id: Uuid,
        event_id: Uuid,
        seats: SeatList,
        price: Price,
        created_at: DateTime<Utc>,
    },

    /// Booking was cancelled and its seats released
    BookingCancelled {
        booking_id: Uuid,
        cancelled_at: DateTime<Utc>,
    },
}

impl BookingLifecycle {
    /// Get the change type as a string
    pub fn change_type(&self) -> &'static str {
        match self {
            BookingLifecycle::BookingCreated { .. } => "BookingCreated",
            BookingLifecycle::BookingCancelled { .. } => "BookingCancelled",
        }
    }

    /// Get the booking ID this change relates to
    pub fn booking_id(&self) -> Uuid {
        match self {
            BookingLifecycle::BookingCreated { booking_id, .. } => *booking_id,
            BookingLifecycle::BookingCancelled { booking_id, .. } => *booking_id,
        }
    }
}
