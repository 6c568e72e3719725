//! Command definitions
//!
//! Commands represent intentions to change the system state. Fields arrive
//! raw; handlers validate them into domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =========================================================================
// RegisterUserCommand
// =========================================================================

/// Command to register a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserCommand {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl RegisterUserCommand {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

// =========================================================================
// CreateEventCommand
// =========================================================================

/// Command to schedule a new event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventCommand {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub time: String,
    pub capacity: i64,
    /// Price per seat
    pub price: Decimal,
}

impl CreateEventCommand {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        capacity: i64,
        price: Decimal,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            date: date.into(),
            time: time.into(),
            capacity,
            price,
        }
    }
}

// =========================================================================
// UpdateEventCommand
// =========================================================================

/// Partial update of an event; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

impl UpdateEventCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }
}

// =========================================================================
// CreateBookingCommand
// =========================================================================

/// Command to book seats on an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingCommand {
    /// Owner of the booking
    pub user_id: Uuid,
    pub event_id: Uuid,
    /// Seat labels, e.g. `["A1", "A2"]`
    pub seats: Vec<String>,
}

impl CreateBookingCommand {
    pub fn new<I, S>(user_id: Uuid, event_id: Uuid, seats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id,
            event_id,
            seats: seats.into_iter().map(Into::into).collect(),
        }
    }
}
