//! Command Handlers module
//!
//! Handlers authorize the caller, validate raw input into domain types and
//! hand the resulting decision to the store as one atomic unit.

mod booking_handler;
mod commands;
mod event_handler;
mod user_handler;


pub use booking_handler::BookingLedger;
pub use commands::*;
pub use event_handler::EventRegistry;
pub use user_handler::UserDirectory;
