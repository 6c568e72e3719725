//! Query module
//!
//! Listing and search over events and bookings.

mod filter;
mod service;

pub use filter::{BookingFilter, SearchTerm};
pub use service::QueryService;
