//! Event schedule parsing
//!
//! Calendar date plus time-of-day, as submitted by the admin event form.

use chrono::{NaiveDate, NaiveTime};

use super::DomainError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(raw: &str) -> Result<NaiveDate, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("date", "Event date is required"));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| DomainError::validation("date", format!("expected YYYY-MM-DD, got '{}'", raw)))
}

/// Parse a time of day in `HH:MM` or `HH:MM:SS` form.
pub fn parse_time(raw: &str) -> Result<NaiveTime, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("time", "Event time is required"));
    }

    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| DomainError::validation("time", format!("expected HH:MM, got '{}'", raw)))
}
