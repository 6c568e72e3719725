//! In-memory store
//!
//! Each event lives in its own `Mutex` slot together with the seats its
//! active bookings hold, so capacity and seat checks need only that slot
//! and bookings against different events never contend. Lock order is
//! always event slot, then the audit log, then the bookings or users map.
//! Every fallible step runs before the first mutation, and no guard is held
//! across an `.await`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::aggregate::{Aggregate, Booking, Event, EventCommand, User};
use crate::audit::{AuditEntry, PendingEntry};
use crate::domain::{DomainError, EventLifecycle, OperationContext, Resource, SeatList};
use crate::error::{AppError, AppResult};

use super::{BookingScope, BookingView, Store};

/// One event and the seats held by its active bookings
#[derive(Debug)]
struct EventSlot {
    event: Event,
    taken_seats: HashSet<String>,
}

type SharedSlot = Arc<Mutex<EventSlot>>;

/// Process-local store for development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<Uuid, SharedSlot>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
    users: RwLock<HashMap<Uuid, User>>,
    audit: Mutex<Vec<AuditEntry>>,
}

fn poisoned<T>(_: PoisonError<T>) -> AppError {
    AppError::Internal("memory store lock poisoned".to_string())
}

fn append(audit: &mut Vec<AuditEntry>, entries: Vec<PendingEntry>) {
    let now = Utc::now();
    for entry in entries {
        let sequence = audit.len() as i64 + 1;
        audit.push(entry.into_entry(sequence, now));
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, event_id: Uuid) -> AppResult<Option<SharedSlot>> {
        let events = self.events.read().map_err(poisoned)?;
        Ok(events.get(&event_id).cloned())
    }

    fn require_slot(&self, event_id: Uuid) -> AppResult<SharedSlot> {
        self.slot(event_id)?
            .ok_or_else(|| DomainError::not_found(Resource::Event, event_id).into())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, user: &User, context: &OperationContext) -> AppResult<()> {
        let entry = PendingEntry::user_registered(user, context)?;

        let mut audit = self.audit.lock().map_err(poisoned)?;
        let mut users = self.users.write().map_err(poisoned)?;
        if users.values().any(|u| u.email() == user.email()) {
            return Err(DomainError::validation("email", "Email already registered").into());
        }

        users.insert(user.id(), user.clone());
        append(&mut audit, vec![entry]);
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&user_id).cloned())
    }

    async fn insert_event(
        &self,
        event: &Event,
        change: &EventLifecycle,
        context: &OperationContext,
    ) -> AppResult<()> {
        let entry = PendingEntry::event(change, context)?;
        let slot = EventSlot {
            event: event.clone(),
            taken_seats: HashSet::new(),
        };

        let mut audit = self.audit.lock().map_err(poisoned)?;
        let mut events = self.events.write().map_err(poisoned)?;
        events.insert(event.id(), Arc::new(Mutex::new(slot)));
        append(&mut audit, vec![entry]);
        Ok(())
    }

    async fn get_event(&self, event_id: Uuid) -> AppResult<Option<Event>> {
        match self.slot(event_id)? {
            Some(slot) => Ok(Some(slot.lock().map_err(poisoned)?.event.clone())),
            None => Ok(None),
        }
    }

    async fn apply_event_command(
        &self,
        event_id: Uuid,
        command: &EventCommand,
        context: &OperationContext,
    ) -> AppResult<Event> {
        let slot = self.require_slot(event_id)?;
        let mut held = slot.lock().map_err(poisoned)?;

        let Some(change) = held.event.decide(command)? else {
            return Ok(held.event.clone());
        };

        let entry = PendingEntry::event(&change, context)?;
        let updated = held.event.clone().apply(change);

        let mut audit = self.audit.lock().map_err(poisoned)?;
        held.event = updated.clone();
        append(&mut audit, vec![entry]);

        Ok(updated)
    }

    async fn list_active_events(&self) -> AppResult<Vec<Event>> {
        let slots: Vec<SharedSlot> = {
            let events = self.events.read().map_err(poisoned)?;
            events.values().cloned().collect()
        };

        let mut active = Vec::with_capacity(slots.len());
        for slot in slots {
            let held = slot.lock().map_err(poisoned)?;
            if !held.event.is_soft_deleted() {
                active.push(held.event.clone());
            }
        }

        active.sort_by(|a, b| {
            (a.date(), a.time(), a.created_at(), a.id())
                .cmp(&(b.date(), b.time(), b.created_at(), b.id()))
        });
        Ok(active)
    }

    async fn commit_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        event_id: Uuid,
        seats: SeatList,
        context: &OperationContext,
    ) -> AppResult<Booking> {
        let slot = self.require_slot(event_id)?;
        let mut held = slot.lock().map_err(poisoned)?;

        let opened = Booking::open(
            booking_id,
            user_id,
            seats,
            &held.event,
            held.taken_seats.iter().map(String::as_str),
        )?;

        let entries = vec![
            PendingEntry::booking(&opened.booking_change, context)?,
            PendingEntry::event(&opened.event_change, context)?,
        ];

        let mut audit = self.audit.lock().map_err(poisoned)?;
        let mut bookings = self.bookings.write().map_err(poisoned)?;

        held.taken_seats.extend(opened.booking.seats().iter().map(str::to_string));
        held.event = opened.event;
        bookings.insert(booking_id, opened.booking.clone());
        append(&mut audit, entries);

        Ok(opened.booking)
    }

    async fn cancel_booking(
        &self,
        booking_id: Uuid,
        context: &OperationContext,
    ) -> AppResult<Booking> {
        let event_id = {
            let bookings = self.bookings.read().map_err(poisoned)?;
            bookings
                .get(&booking_id)
                .map(Booking::event_id)
                .ok_or(DomainError::not_found(Resource::Booking, booking_id))?
        };

        let slot = self.require_slot(event_id)?;
        let mut held = slot.lock().map_err(poisoned)?;

        // A booking only changes under its event's lock, so this copy is current
        let booking = {
            let bookings = self.bookings.read().map_err(poisoned)?;
            bookings
                .get(&booking_id)
                .cloned()
                .ok_or(DomainError::not_found(Resource::Booking, booking_id))?
        };

        let Some(closed) = booking.close(&held.event)? else {
            return Ok(booking);
        };

        let entries = vec![
            PendingEntry::booking(&closed.booking_change, context)?,
            PendingEntry::event(&closed.event_change, context)?,
        ];

        let mut audit = self.audit.lock().map_err(poisoned)?;
        let mut bookings = self.bookings.write().map_err(poisoned)?;

        for seat in closed.booking.seats().iter() {
            held.taken_seats.remove(seat);
        }
        held.event = closed.event;
        bookings.insert(booking_id, closed.booking.clone());
        append(&mut audit, entries);

        Ok(closed.booking)
    }

    async fn get_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let bookings = self.bookings.read().map_err(poisoned)?;
        Ok(bookings.get(&booking_id).cloned())
    }

    async fn list_bookings(&self, scope: BookingScope) -> AppResult<Vec<BookingView>> {
        // Copy out first: event slots must never be locked while holding bookings
        let mut matching: Vec<Booking> = {
            let bookings = self.bookings.read().map_err(poisoned)?;
            bookings
                .values()
                .filter(|b| b.is_active() && scope.matches(b))
                .cloned()
                .collect()
        };
        matching.sort_by(|a, b| (a.created_at(), a.id()).cmp(&(b.created_at(), b.id())));

        let mut views = Vec::with_capacity(matching.len());
        for booking in matching {
            let event_title = match self.get_event(booking.event_id()).await? {
                Some(event) => event.title().to_string(),
                None => String::new(),
            };
            let user_name = match self.get_user(booking.user_id()).await? {
                Some(user) => user.name().to_string(),
                None => String::new(),
            };
            views.push(BookingView {
                booking,
                user_name,
                event_title,
            });
        }

        Ok(views)
    }

    async fn audit_trail(&self, aggregate_id: Uuid) -> AppResult<Vec<AuditEntry>> {
        let audit = self.audit.lock().map_err(poisoned)?;
        Ok(audit
            .iter()
            .filter(|entry| entry.aggregate_id == aggregate_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Caller, EventChanges, EventDetails, Role};
    use rust_decimal_macros::dec;

    fn admin_context() -> OperationContext {
        OperationContext::new().with_caller(Caller::admin(Uuid::new_v4()))
    }

    async fn seeded_event(store: &MemoryStore, capacity: i64) -> Event {
        let details =
            EventDetails::parse("Recital", "Piano", "2026-03-14", "18:30", capacity, dec!(12.50))
                .unwrap();
        let (event, change) = Event::create(Uuid::new_v4(), details);
        store.insert_event(&event, &change, &admin_context()).await.unwrap();
        event
    }

    fn seats(list: &[&str]) -> SeatList {
        SeatList::new(list.iter().copied()).unwrap()
    }

    #[tokio::test]
    async fn test_commit_and_cancel_keep_count_in_step() {
        let store = MemoryStore::new();
        let event = seeded_event(&store, 3).await;
        let ctx = admin_context();

        let booking = store
            .commit_booking(Uuid::new_v4(), Uuid::new_v4(), event.id(), seats(&["A1", "A2"]), &ctx)
            .await
            .unwrap();
        assert_eq!(store.get_event(event.id()).await.unwrap().unwrap().booked_count(), 2);

        store.cancel_booking(booking.id(), &ctx).await.unwrap();
        store.cancel_booking(booking.id(), &ctx).await.unwrap();
        assert_eq!(store.get_event(event.id()).await.unwrap().unwrap().booked_count(), 0);

        // Created, Cancelled: the repeat cancel recorded nothing
        assert_eq!(store.audit_trail(booking.id()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_trace() {
        let store = MemoryStore::new();
        let event = seeded_event(&store, 1).await;
        let ctx = admin_context();

        let err = store
            .commit_booking(Uuid::new_v4(), Uuid::new_v4(), event.id(), seats(&["A1", "A2"]), &ctx)
            .await
            .unwrap_err();
        assert!(err.domain().unwrap().is_capacity_error());

        assert_eq!(store.get_event(event.id()).await.unwrap().unwrap().booked_count(), 0);
        assert!(store.list_bookings(BookingScope::all()).await.unwrap().is_empty());
        assert_eq!(store.audit_trail(event.id()).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_busy_event_does_not_block_other_events() {
        let store = Arc::new(MemoryStore::new());
        let busy = seeded_event(&store, 5).await;
        let idle_id = seeded_event(&store, 5).await.id();

        // Hold the first event as an in-flight commit would
        let busy_slot = store.slot(busy.id()).unwrap().unwrap();
        let _held = busy_slot.lock().unwrap();

        let other = store.clone();
        let commit = tokio::spawn(async move {
            other
                .commit_booking(Uuid::new_v4(), Uuid::new_v4(), idle_id, seats(&["B1"]), &admin_context())
                .await
        });

        let booking = tokio::time::timeout(std::time::Duration::from_secs(2), commit)
            .await
            .expect("commit on another event waited for a busy event")
            .unwrap()
            .unwrap();
        assert_eq!(booking.event_id(), idle_id);
    }

    #[tokio::test]
    async fn test_cancel_frees_seats_for_rebooking() {
        let store = MemoryStore::new();
        let event = seeded_event(&store, 4).await;
        let ctx = admin_context();

        let first = store
            .commit_booking(Uuid::new_v4(), Uuid::new_v4(), event.id(), seats(&["C1", "C2"]), &ctx)
            .await
            .unwrap();

        let err = store
            .commit_booking(Uuid::new_v4(), Uuid::new_v4(), event.id(), seats(&["C2"]), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::SeatConflict { .. })));

        store.cancel_booking(first.id(), &ctx).await.unwrap();
        store
            .commit_booking(Uuid::new_v4(), Uuid::new_v4(), event.id(), seats(&["C2", "C1"]), &ctx)
            .await
            .unwrap();
        assert_eq!(store.get_event(event.id()).await.unwrap().unwrap().booked_count(), 2);
    }

    #[tokio::test]
    async fn test_unwritable_audit_log_leaves_state_untouched() {
        let store = MemoryStore::new();
        let event = seeded_event(&store, 3).await;
        let ctx = admin_context();
        let booking = store
            .commit_booking(Uuid::new_v4(), Uuid::new_v4(), event.id(), seats(&["D1"]), &ctx)
            .await
            .unwrap();

        std::thread::scope(|scope| {
            let poisoner = scope.spawn(|| {
                let _audit = store.audit.lock().unwrap();
                panic!("writer died holding the audit log");
            });
            assert!(poisoner.join().is_err());
        });

        let err = store
            .commit_booking(Uuid::new_v4(), Uuid::new_v4(), event.id(), seats(&["D2"]), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let err = store.cancel_booking(booking.id(), &ctx).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let err = store
            .apply_event_command(event.id(), &EventCommand::SoftDelete, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let current = store.get_event(event.id()).await.unwrap().unwrap();
        assert_eq!(current.booked_count(), 1);
        assert!(!current.is_soft_deleted());
        assert!(store.get_booking(booking.id()).await.unwrap().unwrap().is_active());
        assert_eq!(store.list_bookings(BookingScope::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_soft_deleted_events_hidden_but_retrievable() {
        let store = MemoryStore::new();
        let event = seeded_event(&store, 5).await;
        let ctx = admin_context();

        store
            .apply_event_command(event.id(), &EventCommand::SoftDelete, &ctx)
            .await
            .unwrap();

        assert!(store.list_active_events().await.unwrap().is_empty());
        assert!(store.get_event(event.id()).await.unwrap().unwrap().is_soft_deleted());
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let store = MemoryStore::new();
        let changes = EventChanges {
            title: Some("New".to_string()),
            ..Default::default()
        };

        let err = store
            .apply_event_command(Uuid::new_v4(), &EventCommand::Update(changes), &admin_context())
            .await
            .unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let first =
            User::register(Uuid::new_v4(), "Erin Hale", "erin@example.com", "5551234567", Role::User)
                .unwrap();
        let second =
            User::register(Uuid::new_v4(), "Erin Other", "ERIN@example.com", "5557654321", Role::User)
                .unwrap();

        store.insert_user(&first, &ctx).await.unwrap();
        let err = store.insert_user(&second, &ctx).await.unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::Validation { field: "email", .. })));
    }
}
