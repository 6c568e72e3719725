//! Event Aggregate
//!
//! A scheduled occasion with finite seat capacity. The event is the only
//! writer of its own `booked_count`: reservations and releases are decided
//! here and applied as lifecycle changes.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, EventChanges, EventDetails, EventLifecycle, Price, Resource};

use super::Aggregate;

/// Administrator command against an existing event
#[derive(Debug, Clone, PartialEq)]
pub enum EventCommand {
    Update(EventChanges),
    SoftDelete,
}

/// Event Aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) date: NaiveDate,
    pub(crate) time: NaiveTime,
    pub(crate) capacity: u32,
    pub(crate) price: Price,
    /// Sum of seats over active bookings
    pub(crate) booked_count: u32,
    pub(crate) soft_deleted: bool,
    pub(crate) version: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Event {
    // =========================================================================
    // Event::create()
    // =========================================================================

    /// Create a new event and generate the creation change
    pub fn create(event_id: Uuid, details: EventDetails) -> (Self, EventLifecycle) {
        let now = Utc::now();

        let change = EventLifecycle::EventCreated {
            event_id,
            title: details.title.clone(),
            description: details.description.clone(),
            date: details.date,
            time: details.time,
            capacity: details.capacity,
            price: details.price,
            created_at: now,
        };

        let event = Self {
            id: event_id,
            title: details.title,
            description: details.description,
            date: details.date,
            time: details.time,
            capacity: details.capacity,
            price: details.price,
            booked_count: 0,
            soft_deleted: false,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        (event, change)
    }

    // =========================================================================
    // Administrator commands
    // =========================================================================

    /// Decide the outcome of an administrator command.
    ///
    /// `Ok(None)` means the command is an idempotent no-op.
    pub fn decide(&self, command: &EventCommand) -> Result<Option<EventLifecycle>, DomainError> {
        match command {
            EventCommand::Update(changes) => self.update(changes).map(Some),
            EventCommand::SoftDelete => Ok(self.soft_delete()),
        }
    }

    /// Edit fields of a live event
    pub fn update(&self, changes: &EventChanges) -> Result<EventLifecycle, DomainError> {
        if self.soft_deleted {
            return Err(DomainError::not_found(Resource::Event, self.id));
        }

        if let Some(capacity) = changes.capacity {
            if capacity < self.booked_count {
                return Err(DomainError::CapacityBelowBooked {
                    capacity,
                    booked: self.booked_count,
                });
            }
        }

        Ok(EventLifecycle::EventUpdated {
            event_id: self.id,
            changes: changes.clone(),
            updated_at: Utc::now(),
        })
    }

    /// Withdraw the event; `None` if it is already withdrawn
    pub fn soft_delete(&self) -> Option<EventLifecycle> {
        if self.soft_deleted {
            return None;
        }

        Some(EventLifecycle::EventSoftDeleted {
            event_id: self.id,
            deleted_at: Utc::now(),
        })
    }

    // =========================================================================
    // Capacity accounting
    // =========================================================================

    /// Count `seats` against capacity on behalf of `booking_id`
    pub fn reserve_capacity(
        &self,
        booking_id: Uuid,
        seats: u32,
    ) -> Result<EventLifecycle, DomainError> {
        if self.soft_deleted {
            return Err(DomainError::EventUnavailable(self.id));
        }

        if seats == 0 {
            return Err(DomainError::validation("seats", "at least one seat is required"));
        }

        let remaining = self.remaining_capacity();
        if seats > remaining {
            return Err(DomainError::CapacityExceeded {
                requested: seats,
                remaining,
            });
        }

        Ok(EventLifecycle::CapacityReserved {
            event_id: self.id,
            booking_id,
            seats,
            reserved_at: Utc::now(),
        })
    }

    /// Return `seats` to capacity after `booking_id` is cancelled.
    ///
    /// Allowed on soft-deleted events: their bookings remain cancellable.
    pub fn release_capacity(
        &self,
        booking_id: Uuid,
        seats: u32,
    ) -> Result<EventLifecycle, DomainError> {
        if seats > self.booked_count {
            return Err(DomainError::ReleaseExceedsBooked {
                requested: seats,
                booked: self.booked_count,
            });
        }

        Ok(EventLifecycle::CapacityReleased {
            event_id: self.id,
            booking_id,
            seats,
            released_at: Utc::now(),
        })
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn booked_count(&self) -> u32 {
        self.booked_count
    }

    pub fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.booked_count)
    }

    pub fn is_soft_deleted(&self) -> bool {
        self.soft_deleted
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

// =========================================================================
// Event::apply()
// =========================================================================

impl Aggregate for Event {
    type Change = EventLifecycle;

    fn aggregate_type() -> &'static str {
        "Event"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(mut self, change: Self::Change) -> Self {
        match change {
            EventLifecycle::EventCreated {
                event_id,
                title,
                description,
                date,
                time,
                capacity,
                price,
                created_at,
            } => {
                self.id = event_id;
                self.title = title;
                self.description = description;
                self.date = date;
                self.time = time;
                self.capacity = capacity;
                self.price = price;
                self.booked_count = 0;
                self.soft_deleted = false;
                self.created_at = created_at;
                self.updated_at = created_at;
            }

            EventLifecycle::EventUpdated {
                changes,
                updated_at,
                ..
            } => {
                if let Some(title) = changes.title {
                    self.title = title;
                }
                if let Some(description) = changes.description {
                    self.description = description;
                }
                if let Some(date) = changes.date {
                    self.date = date;
                }
                if let Some(time) = changes.time {
                    self.time = time;
                }
                if let Some(capacity) = changes.capacity {
                    self.capacity = capacity;
                }
                if let Some(price) = changes.price {
                    self.price = price;
                }
                self.updated_at = updated_at;
            }

            EventLifecycle::EventSoftDeleted { deleted_at, .. } => {
                self.soft_deleted = true;
                self.updated_at = deleted_at;
            }

            EventLifecycle::CapacityReserved {
                seats, reserved_at, ..
            } => {
                let booked = self.booked_count.saturating_add(seats);
                if booked > self.capacity {
                    tracing::error!(
                        event_id = %self.id,
                        booked,
                        capacity = self.capacity,
                        "Reservation applied beyond capacity"
                    );
                }
                self.booked_count = booked;
                self.updated_at = reserved_at;
            }

            EventLifecycle::CapacityReleased {
                seats, released_at, ..
            } => {
                if seats > self.booked_count {
                    tracing::error!(
                        event_id = %self.id,
                        seats,
                        booked = self.booked_count,
                        "Release applied beyond booked count"
                    );
                }
                self.booked_count = self.booked_count.saturating_sub(seats);
                self.updated_at = released_at;
            }
        }

        self.version += 1;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn concert(capacity: i64) -> Event {
        let details = EventDetails::parse(
            "Summer Music Festival",
            "Open air",
            "2026-07-01",
            "18:00",
            capacity,
            dec!(25),
        )
        .unwrap();
        Event::create(Uuid::new_v4(), details).0
    }

    #[test]
    fn test_event_create() {
        let event_id = Uuid::new_v4();
        let details =
            EventDetails::parse("Expo", "Trade fair", "2026-03-10", "09:00", 40, dec!(0)).unwrap();

        let (event, change) = Event::create(event_id, details);

        assert_eq!(event.id(), event_id);
        assert_eq!(event.booked_count(), 0);
        assert!(!event.is_soft_deleted());
        assert_eq!(event.version(), 1);
        assert!(matches!(change, EventLifecycle::EventCreated { .. }));
    }

    #[test]
    fn test_reserve_and_release() {
        let event = concert(3);
        let booking_id = Uuid::new_v4();

        let reserved = event.reserve_capacity(booking_id, 2).unwrap();
        let event = event.apply(reserved);
        assert_eq!(event.booked_count(), 2);
        assert_eq!(event.remaining_capacity(), 1);
        assert_eq!(event.version(), 2);

        let released = event.release_capacity(booking_id, 2).unwrap();
        let event = event.apply(released);
        assert_eq!(event.booked_count(), 0);
    }

    #[test]
    fn test_reserve_beyond_capacity_rejected() {
        let event = concert(2);
        let event = event.clone().apply(event.reserve_capacity(Uuid::new_v4(), 2).unwrap());

        let result = event.reserve_capacity(Uuid::new_v4(), 1);
        assert_eq!(
            result,
            Err(DomainError::CapacityExceeded {
                requested: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_soft_deleted_event_unavailable() {
        let event = concert(10);
        let change = event.soft_delete().unwrap();
        let event = event.apply(change);

        assert!(event.is_soft_deleted());
        assert_eq!(
            event.reserve_capacity(Uuid::new_v4(), 1),
            Err(DomainError::EventUnavailable(event.id()))
        );
        // Repeat soft delete is a no-op
        assert!(event.soft_delete().is_none());
        assert_eq!(event.decide(&EventCommand::SoftDelete), Ok(None));
    }

    #[test]
    fn test_release_allowed_after_soft_delete() {
        let event = concert(10);
        let booking_id = Uuid::new_v4();
        let event = event.clone().apply(event.reserve_capacity(booking_id, 4).unwrap());
        let event = event.clone().apply(event.soft_delete().unwrap());

        let released = event.release_capacity(booking_id, 4).unwrap();
        assert_eq!(event.apply(released).booked_count(), 0);
    }

    #[test]
    fn test_release_more_than_booked_rejected() {
        let event = concert(10);
        assert!(matches!(
            event.release_capacity(Uuid::new_v4(), 1),
            Err(DomainError::ReleaseExceedsBooked { .. })
        ));
    }

    #[test]
    fn test_update_cannot_drop_capacity_below_booked() {
        let event = concert(10);
        let event = event.clone().apply(event.reserve_capacity(Uuid::new_v4(), 6).unwrap());

        let shrink = EventChanges {
            capacity: Some(5),
            ..Default::default()
        };
        assert_eq!(
            event.update(&shrink),
            Err(DomainError::CapacityBelowBooked {
                capacity: 5,
                booked: 6
            })
        );

        let exact = EventChanges {
            capacity: Some(6),
            price: Some(Price::new(dec!(30)).unwrap()),
            ..Default::default()
        };
        let event = event.clone().apply(event.update(&exact).unwrap());
        assert_eq!(event.capacity(), 6);
        assert_eq!(event.price().value(), dec!(30));
        assert_eq!(event.remaining_capacity(), 0);
    }

    #[test]
    fn test_update_soft_deleted_is_not_found() {
        let event = concert(10);
        let event = event.clone().apply(event.soft_delete().unwrap());

        let changes = EventChanges {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let result = event.decide(&EventCommand::Update(changes));
        assert!(matches!(
            result,
            Err(DomainError::NotFound {
                resource: Resource::Event,
                ..
            })
        ));
    }
}
