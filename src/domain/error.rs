//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;
use uuid::Uuid;

/// Which kind of record an id failed to resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Event,
    Booking,
    User,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Event => write!(f, "Event"),
            Resource::Booking => write!(f, "Booking"),
            Resource::User => write!(f, "User"),
        }
    }
}

/// Coarse error category surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    EventUnavailable,
    Capacity,
    SeatConflict,
    Forbidden,
    Unauthenticated,
}

/// Domain-specific errors
///
/// These errors represent rejected commands and domain invariant failures.
/// Every variant is recoverable by the caller; none of them is retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed or missing input field
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Unknown id
    #[error("{resource} not found: {id}")]
    NotFound { resource: Resource, id: Uuid },

    /// Operation against a soft-deleted event
    #[error("Event is no longer available: {0}")]
    EventUnavailable(Uuid),

    /// Reservation would exceed the remaining capacity
    #[error("Capacity exceeded: requested {requested}, remaining {remaining}")]
    CapacityExceeded { requested: u32, remaining: u32 },

    /// Capacity cannot drop below the seats already booked
    #[error("Capacity {capacity} is below the {booked} seats already booked")]
    CapacityBelowBooked { capacity: u32, booked: u32 },

    /// Releasing more seats than are booked
    #[error("Cannot release {requested} seats, only {booked} booked")]
    ReleaseExceedsBooked { requested: u32, booked: u32 },

    /// Seats already held by another active booking for the same event
    #[error("Seats already booked: {}", .seats.join(", "))]
    SeatConflict { seats: Vec<String> },

    /// Caller lacks the role or ownership required
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Command issued without a caller identity
    #[error("Caller identity required")]
    Unauthenticated,
}

impl DomainError {
    /// Create a validation error for a named field
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(resource: Resource, id: Uuid) -> Self {
        Self::NotFound { resource, id }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::EventUnavailable(_) => ErrorKind::EventUnavailable,
            Self::CapacityExceeded { .. }
            | Self::CapacityBelowBooked { .. }
            | Self::ReleaseExceedsBooked { .. } => ErrorKind::Capacity,
            Self::SeatConflict { .. } => ErrorKind::SeatConflict,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
        }
    }

    /// Check if this is a capacity error
    pub fn is_capacity_error(&self) -> bool {
        self.kind() == ErrorKind::Capacity
    }
}
