//! Filter and search predicates shared by every listing.

use serde::Deserialize;
use uuid::Uuid;

use crate::aggregate::{Aggregate, Event};
use crate::store::{BookingScope, BookingView};

/// Case-insensitive substring search. A blank term matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(Option<String>);

impl SearchTerm {
    pub fn new(term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            Self(None)
        } else {
            Self(Some(term.to_lowercase()))
        }
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_none()
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.0 {
            Some(needle) => text.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }

    /// Event search looks at the title only
    pub fn matches_event(&self, event: &Event) -> bool {
        self.matches(event.title())
    }

    /// Booking search: booking id, owner's name or event title
    pub fn matches_booking(&self, view: &BookingView) -> bool {
        self.matches(&view.booking.id().to_string())
            || self.matches(&view.user_name)
            || self.matches(&view.event_title)
    }
}

/// Optional restrictions for listing active bookings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BookingFilter {
    pub user_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
}

impl BookingFilter {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            event_id: None,
        }
    }

    pub fn for_event(event_id: Uuid) -> Self {
        Self {
            user_id: None,
            event_id: Some(event_id),
        }
    }
}

impl From<BookingFilter> for BookingScope {
    fn from(filter: BookingFilter) -> Self {
        BookingScope {
            user_id: filter.user_id,
            event_id: filter.event_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Booking;
    use crate::domain::{EventDetails, SeatList};
    use rust_decimal_macros::dec;

    fn event(title: &str) -> Event {
        let details =
            EventDetails::parse(title, "desc", "2026-07-04", "20:00", 10, dec!(15)).unwrap();
        Event::create(Uuid::new_v4(), details).0
    }

    fn view(user_name: &str, event_title: &str) -> BookingView {
        let event = event(event_title);
        let seats = SeatList::new(["A1"]).unwrap();
        let opened =
            Booking::open(Uuid::new_v4(), Uuid::new_v4(), seats, &event, std::iter::empty())
                .unwrap();
        BookingView {
            booking: opened.booking,
            user_name: user_name.to_string(),
            event_title: event_title.to_string(),
        }
    }

    #[test]
    fn test_blank_term_matches_everything() {
        let term = SearchTerm::new("   ");
        assert!(term.is_blank());
        assert!(term.matches_event(&event("Anything")));
    }

    #[test]
    fn test_event_search_is_case_insensitive_on_title() {
        let term = SearchTerm::new("JAZZ");
        assert!(term.matches_event(&event("Late night jazz")));
        assert!(!term.matches_event(&event("Opera")));
    }

    #[test]
    fn test_booking_search_fields() {
        let booking = view("Priya Nair", "Summer Fest");

        assert!(SearchTerm::new("priya").matches_booking(&booking));
        assert!(SearchTerm::new("fest").matches_booking(&booking));

        let id_prefix = booking.booking.id().to_string()[..8].to_uppercase();
        assert!(SearchTerm::new(&id_prefix).matches_booking(&booking));

        assert!(!SearchTerm::new("Opera").matches_booking(&booking));
    }

    #[test]
    fn test_filter_into_scope() {
        let user = Uuid::new_v4();
        let scope: BookingScope = BookingFilter::for_user(user).into();
        assert_eq!(scope, BookingScope::for_user(user));
    }
}
