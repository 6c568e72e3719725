//! Seat list
//!
//! The seats claimed by one booking.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::DomainError;

/// Ordered, non-empty list of distinct seat identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SeatList(Vec<String>);

impl SeatList {
    /// Validate raw seat identifiers.
    ///
    /// Seats are trimmed; order is preserved.
    ///
    /// # Errors
    /// `DomainError::Validation` on an empty list, a blank seat or a duplicate.
    pub fn new<I, S>(seats: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut list = Vec::new();

        for seat in seats {
            let seat = seat.as_ref().trim();
            if seat.is_empty() {
                return Err(DomainError::validation("seats", "seat identifier cannot be blank"));
            }
            if !seen.insert(seat.to_string()) {
                return Err(DomainError::validation(
                    "seats",
                    format!("seat '{}' listed more than once", seat),
                ));
            }
            list.push(seat.to_string());
        }

        if list.is_empty() {
            return Err(DomainError::validation("seats", "at least one seat is required"));
        }

        Ok(Self(list))
    }

    /// Number of seats, as counted against capacity
    pub fn count(&self) -> u32 {
        // A list longer than u32::MAX cannot fit any capacity anyway
        u32::try_from(self.0.len()).unwrap_or(u32::MAX)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Seats of this list that already appear in `taken`, in list order.
    pub fn overlapping<'a, I>(&self, taken: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let taken: HashSet<&str> = taken.into_iter().collect();
        self.0
            .iter()
            .filter(|seat| taken.contains(seat.as_str()))
            .cloned()
            .collect()
    }
}

impl TryFrom<Vec<String>> for SeatList {
    type Error = DomainError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        SeatList::new(value)
    }
}

impl From<SeatList> for Vec<String> {
    fn from(seats: SeatList) -> Self {
        seats.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_list_preserves_order() {
        let seats = SeatList::new(["B2", " A1 ", "C3"]).unwrap();
        assert_eq!(seats.as_slice(), &["B2", "A1", "C3"]);
        assert_eq!(seats.count(), 3);
    }

    #[test]
    fn test_seat_list_rejects_empty() {
        let seats = SeatList::new(Vec::<String>::new());
        assert!(matches!(seats, Err(DomainError::Validation { field: "seats", .. })));
    }

    #[test]
    fn test_seat_list_rejects_blank_and_duplicates() {
        assert!(SeatList::new(["A1", "  "]).is_err());
        assert!(SeatList::new(["A1", "A1"]).is_err());
        // Trimmed duplicates are still duplicates
        assert!(SeatList::new(["A1", " A1"]).is_err());
    }

    #[test]
    fn test_overlapping_seats() {
        let seats = SeatList::new(["A1", "A2", "A3"]).unwrap();
        let taken = ["A3", "Z9", "A1"];
        assert_eq!(seats.overlapping(taken), vec!["A1".to_string(), "A3".to_string()]);
        assert!(seats.overlapping(["B1"]).is_empty());
    }

    #[test]
    fn test_seat_list_deserialize_validates() {
        let ok: SeatList = serde_json::from_str(r#"["A1","A2"]"#).unwrap();
        assert_eq!(ok.count(), 2);

        let dup: Result<SeatList, _> = serde_json::from_str(r#"["A1","A1"]"#);
        assert!(dup.is_err());
    }
}
