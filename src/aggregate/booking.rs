//! Booking Aggregate
//!
//! A reservation of one or more seats against one event. Opening and
//! closing a booking always goes through the event's capacity rules, so
//! both records change together or not at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BookingLifecycle, DomainError, EventLifecycle, Price, SeatList};

use super::{Aggregate, Event};

/// Booking Aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) event_id: Uuid,
    pub(crate) seats: SeatList,
    /// Total paid, fixed at creation
    pub(crate) price: Price,
    pub(crate) cancelled: bool,
    pub(crate) version: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) cancelled_at: Option<DateTime<Utc>>,
}

/// Outcome of a successful booking: both records and both changes
#[derive(Debug, Clone)]
pub struct OpenedBooking {
    pub booking: Booking,
    pub booking_change: BookingLifecycle,
    pub event: Event,
    pub event_change: EventLifecycle,
}

/// Outcome of a cancellation that actually released seats
#[derive(Debug, Clone)]
pub struct ClosedBooking {
    pub booking: Booking,
    pub booking_change: BookingLifecycle,
    pub event: Event,
    pub event_change: EventLifecycle,
}

impl Booking {
    // =========================================================================
    // Booking::open()
    // =========================================================================

    /// Book `seats` on `event` for `user_id`.
    ///
    /// `taken_seats` are the seats of every other active booking on the
    /// same event. Must be called while the event is locked.
    pub fn open<'a, I>(
        booking_id: Uuid,
        user_id: Uuid,
        seats: SeatList,
        event: &Event,
        taken_seats: I,
    ) -> Result<OpenedBooking, DomainError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let event_change = event.reserve_capacity(booking_id, seats.count())?;

        let conflicts = seats.overlapping(taken_seats);
        if !conflicts.is_empty() {
            return Err(DomainError::SeatConflict { seats: conflicts });
        }

        let now = Utc::now();
        let price = event.price().times(seats.count());

        let booking_change = BookingLifecycle::BookingCreated {
            booking_id,
            user_id,
            event_id: event.id(),
            seats: seats.clone(),
            price,
            created_at: now,
        };

        let booking = Self {
            id: booking_id,
            user_id,
            event_id: event.id(),
            seats,
            price,
            cancelled: false,
            version: 1,
            created_at: now,
            cancelled_at: None,
        };

        Ok(OpenedBooking {
            booking,
            booking_change,
            event: event.clone().apply(event_change.clone()),
            event_change,
        })
    }

    // =========================================================================
    // Booking::close()
    // =========================================================================

    /// Cancel the booking and release its seats on `event`, which must be
    /// the booking's own event.
    ///
    /// `Ok(None)` if the booking was already cancelled.
    pub fn close(&self, event: &Event) -> Result<Option<ClosedBooking>, DomainError> {
        if self.cancelled {
            return Ok(None);
        }

        debug_assert_eq!(event.id(), self.event_id, "booking closed against another event");

        let event_change = event.release_capacity(self.id, self.seats.count())?;
        let booking_change = BookingLifecycle::BookingCancelled {
            booking_id: self.id,
            cancelled_at: Utc::now(),
        };

        Ok(Some(ClosedBooking {
            booking: self.clone().apply(booking_change.clone()),
            booking_change,
            event: event.clone().apply(event_change.clone()),
            event_change,
        }))
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn seats(&self) -> &SeatList {
        &self.seats
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }
}

impl Aggregate for Booking {
    type Change = BookingLifecycle;

    fn aggregate_type() -> &'static str {
        "Booking"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(mut self, change: Self::Change) -> Self {
        match change {
            BookingLifecycle::BookingCreated {
                booking_id,
                user_id,
                event_id,
                seats,
                price,
                created_at,
            } => {
                self.id = booking_id;
                self.user_id = user_id;
                self.event_id = event_id;
                self.seats = seats;
                self.price = price;
                self.cancelled = false;
                self.created_at = created_at;
                self.cancelled_at = None;
            }

            BookingLifecycle::BookingCancelled { cancelled_at, .. } => {
                self.cancelled = true;
                self.cancelled_at = Some(cancelled_at);
            }
        }

        self.version += 1;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventDetails;
    use rust_decimal_macros::dec;

    fn event_with_capacity(capacity: i64) -> Event {
        let details =
            EventDetails::parse("Gala", "Black tie", "2026-12-31", "21:00", capacity, dec!(40))
                .unwrap();
        Event::create(Uuid::new_v4(), details).0
    }

    fn seats(list: &[&str]) -> SeatList {
        SeatList::new(list.iter().copied()).unwrap()
    }

    #[test]
    fn test_open_snapshots_price_and_reserves() {
        let event = event_with_capacity(5);
        let opened = Booking::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            seats(&["A1", "A2"]),
            &event,
            std::iter::empty(),
        )
        .unwrap();

        assert_eq!(opened.booking.price().value(), dec!(80));
        assert!(opened.booking.is_active());
        assert_eq!(opened.event.booked_count(), 2);
        assert!(matches!(
            opened.event_change,
            EventLifecycle::CapacityReserved { seats: 2, .. }
        ));
    }

    #[test]
    fn test_open_rejects_taken_seat() {
        let event = event_with_capacity(5);
        let result = Booking::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            seats(&["A1", "A2"]),
            &event,
            ["A2", "B7"],
        );

        assert_eq!(
            result.unwrap_err(),
            DomainError::SeatConflict {
                seats: vec!["A2".to_string()]
            }
        );
    }

    #[test]
    fn test_open_capacity_checked_before_seats() {
        let event = event_with_capacity(1);
        let result = Booking::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            seats(&["A1", "A2"]),
            &event,
            ["A1"],
        );

        assert!(result.unwrap_err().is_capacity_error());
    }

    #[test]
    fn test_close_releases_once() {
        let event = event_with_capacity(3);
        let opened = Booking::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            seats(&["C1"]),
            &event,
            std::iter::empty(),
        )
        .unwrap();

        let closed = opened.booking.close(&opened.event).unwrap().unwrap();
        assert!(closed.booking.is_cancelled());
        assert!(closed.booking.cancelled_at().is_some());
        assert_eq!(closed.event.booked_count(), 0);

        // Second cancellation is a no-op
        assert!(closed.booking.close(&closed.event).unwrap().is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "booking closed against another event")]
    fn test_close_against_foreign_event_panics() {
        let event = event_with_capacity(3);
        let opened = Booking::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            seats(&["E1"]),
            &event,
            std::iter::empty(),
        )
        .unwrap();

        let _ = opened.booking.close(&event_with_capacity(3));
    }

    #[test]
    fn test_price_snapshot_survives_event_price_change() {
        let event = event_with_capacity(3);
        let opened = Booking::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            seats(&["D1"]),
            &event,
            std::iter::empty(),
        )
        .unwrap();

        let repriced = crate::domain::EventChanges {
            price: Some(Price::new(dec!(99)).unwrap()),
            ..Default::default()
        };
        let event = opened.event.clone().apply(opened.event.update(&repriced).unwrap());

        assert_eq!(event.price().value(), dec!(99));
        assert_eq!(opened.booking.price().value(), dec!(40));
    }
}
