//! Domain module
//!
//! Core domain types and business rules.

pub mod context;
pub mod details;
pub mod error;
pub mod lifecycle;
pub mod price;
pub mod schedule;
pub mod seats;

pub use context::{Caller, OperationContext, Role};
pub use details::{EventChanges, EventDetails};
pub use error::{DomainError, ErrorKind, Resource};
pub use lifecycle::{BookingLifecycle, EventLifecycle};
pub use price::{Price, PriceError};
pub use seats::SeatList;
