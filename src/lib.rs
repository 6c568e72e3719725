//! ticketDesk Library
//!
//! Re-exports modules for integration testing and external use.

pub mod aggregate;
pub mod api;
pub mod audit;
pub mod domain;
pub mod handlers;
pub mod query;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use domain::{DomainError, ErrorKind, OperationContext, Price, PriceError, SeatList};
pub use domain::{BookingLifecycle, EventLifecycle};
pub use error::{AppError, AppResult, ErrorResponse};
