//! Aggregate module
//!
//! Aggregate Root pattern: every record changes only by applying a
//! lifecycle change produced by one of its own command methods.

pub mod booking;
pub mod event;
pub mod user;

pub use booking::{Booking, ClosedBooking, OpenedBooking};
pub use event::{Event, EventCommand};
pub use user::User;

/// Aggregate trait that all aggregates must implement
pub trait Aggregate: Sized {
    /// The type of changes this aggregate handles
    type Change;

    /// Get the aggregate type name (for storage)
    fn aggregate_type() -> &'static str;

    /// Get the aggregate ID
    fn id(&self) -> uuid::Uuid;

    /// Get the current version (number of changes applied)
    fn version(&self) -> i64;

    /// Apply a change to update the aggregate state
    fn apply(self, change: Self::Change) -> Self;
}
