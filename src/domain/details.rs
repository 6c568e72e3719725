//! Event details
//!
//! Field-level validation shared by event creation and partial updates.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::{parse_date, parse_time};
use super::{DomainError, Price, PriceError};

/// A complete, validated set of event fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub capacity: u32,
    pub price: Price,
}

impl EventDetails {
    /// Validate every field of a new event.
    pub fn parse(
        title: &str,
        description: &str,
        date: &str,
        time: &str,
        capacity: i64,
        price: Decimal,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            title: required_text("title", title)?,
            description: required_text("description", description)?,
            date: parse_date(date)?,
            time: parse_time(time)?,
            capacity: parse_capacity(capacity)?,
            price: parse_price(price)?,
        })
    }
}

/// Validated partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

impl EventChanges {
    /// Validate whichever fields are present, with the creation rules.
    pub fn parse(
        title: Option<&str>,
        description: Option<&str>,
        date: Option<&str>,
        time: Option<&str>,
        capacity: Option<i64>,
        price: Option<Decimal>,
    ) -> Result<Self, DomainError> {
        let changes = Self {
            title: title.map(|t| required_text("title", t)).transpose()?,
            description: description
                .map(|d| required_text("description", d))
                .transpose()?,
            date: date.map(parse_date).transpose()?,
            time: time.map(parse_time).transpose()?,
            capacity: capacity.map(parse_capacity).transpose()?,
            price: price.map(parse_price).transpose()?,
        };

        if changes.is_empty() {
            return Err(DomainError::validation("update", "No changes provided"));
        }

        Ok(changes)
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Names of the fields this update touches
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.date.is_some() {
            fields.push("date");
        }
        if self.time.is_some() {
            fields.push("time");
        }
        if self.capacity.is_some() {
            fields.push("capacity");
        }
        if self.price.is_some() {
            fields.push("price");
        }
        fields
    }
}

fn required_text(field: &'static str, raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn parse_capacity(raw: i64) -> Result<u32, DomainError> {
    if raw <= 0 {
        return Err(DomainError::validation("capacity", "Capacity must be greater than 0"));
    }
    u32::try_from(raw)
        .map_err(|_| DomainError::validation("capacity", format!("Capacity {} is too large", raw)))
}

fn parse_price(raw: Decimal) -> Result<Price, DomainError> {
    Price::new(raw).map_err(|e| match e {
        PriceError::Negative(_) => DomainError::validation("price", "Price cannot be negative"),
        other => DomainError::validation("price", other.to_string()),
    })
}
