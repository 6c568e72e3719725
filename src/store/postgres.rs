//! PostgreSQL store
//!
//! One transaction per command. The event row is taken with
//! `SELECT ... FOR UPDATE`, so every reservation and release against an
//! event is serialized on that row while other events proceed in parallel.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::aggregate::{Aggregate, Booking, Event, EventCommand, User};
use crate::audit::{AuditEntry, PendingEntry};
use crate::domain::{
    DomainError, EventLifecycle, OperationContext, Price, Resource, Role, SeatList,
};
use crate::error::{AppError, AppResult};

use super::{BookingScope, BookingView, Store};

const UNIQUE_VIOLATION: &str = "23505";

const EVENT_COLUMNS: &str = "id, title, description, event_date, event_time, capacity, price, \
     booked_count, soft_deleted, version, created_at, updated_at";

const BOOKING_COLUMNS: &str =
    "id, user_id, event_id, seats, price, cancelled, version, created_at, cancelled_at";

// =========================================================================
// Row mapping
// =========================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|_| AppError::Internal(format!("stored role '{}' is unknown", row.role)))?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    event_date: NaiveDate,
    event_time: NaiveTime,
    capacity: i32,
    price: Decimal,
    booked_count: i32,
    soft_deleted: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str| AppError::Internal(format!("event {} has invalid {}", row.id, what));

        Ok(Event {
            id: row.id,
            capacity: u32::try_from(row.capacity).map_err(|_| corrupt("capacity"))?,
            booked_count: u32::try_from(row.booked_count).map_err(|_| corrupt("booked_count"))?,
            price: Price::from_stored(row.price).map_err(|_| corrupt("price"))?,
            title: row.title,
            description: row.description,
            date: row.event_date,
            time: row.event_time,
            soft_deleted: row.soft_deleted,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    seats: Vec<String>,
    price: Decimal,
    cancelled: bool,
    version: i64,
    created_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |what: &str| AppError::Internal(format!("booking {} has invalid {}", id, what));

        Ok(Booking {
            id,
            user_id: row.user_id,
            event_id: row.event_id,
            seats: SeatList::new(row.seats).map_err(|_| corrupt("seats"))?,
            price: Price::from_stored(row.price).map_err(|_| corrupt("price"))?,
            cancelled: row.cancelled,
            version: row.version,
            created_at: row.created_at,
            cancelled_at: row.cancelled_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookingViewRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    user_name: String,
    event_title: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    sequence: i64,
    aggregate_type: String,
    aggregate_id: Uuid,
    change_type: String,
    payload: serde_json::Value,
    context: serde_json::Value,
    recorded_at: DateTime<Utc>,
}

impl From<AuditRow> for AuditEntry {
    fn from(row: AuditRow) -> Self {
        AuditEntry {
            sequence: row.sequence,
            aggregate_type: row.aggregate_type,
            aggregate_id: row.aggregate_id,
            change_type: row.change_type,
            payload: row.payload,
            context: row.context,
            recorded_at: row.recorded_at,
        }
    }
}

fn to_db_count(value: u32) -> AppResult<i32> {
    i32::try_from(value).map_err(|_| AppError::Internal(format!("count {} out of range", value)))
}

// =========================================================================
// PostgresStore
// =========================================================================

/// Store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgresStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn append_log(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: PendingEntry,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO lifecycle_log (aggregate_type, aggregate_id, change_type, payload, context)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.aggregate_type)
        .bind(entry.aggregate_id)
        .bind(entry.change_type)
        .bind(&entry.payload)
        .bind(&entry.context)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn lock_event(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
    ) -> AppResult<Event> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM ticket_events WHERE id = $1 FOR UPDATE",
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(DomainError::not_found(Resource::Event, event_id).into()),
        }
    }

    async fn write_event(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event: &Event,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE ticket_events
            SET title = $2, description = $3, event_date = $4, event_time = $5,
                capacity = $6, price = $7, booked_count = $8, soft_deleted = $9,
                version = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(event.id())
        .bind(event.title())
        .bind(event.description())
        .bind(event.date())
        .bind(event.time())
        .bind(to_db_count(event.capacity())?)
        .bind(event.price().value())
        .bind(to_db_count(event.booked_count())?)
        .bind(event.is_soft_deleted())
        .bind(event.version())
        .bind(event.updated_at())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert_user(&self, user: &User, context: &OperationContext) -> AppResult<()> {
        let entry = PendingEntry::user_registered(user, context)?;
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, phone, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id())
        .bind(user.name())
        .bind(user.email())
        .bind(user.phone())
        .bind(user.role().as_str())
        .bind(user.created_at())
        .execute(&mut *tx)
        .await;

        if let Err(sqlx::Error::Database(db_err)) = &inserted {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return Err(DomainError::validation("email", "Email already registered").into());
            }
        }
        inserted?;

        self.append_log(&mut tx, entry).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, phone, role, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_event(
        &self,
        event: &Event,
        change: &EventLifecycle,
        context: &OperationContext,
    ) -> AppResult<()> {
        let entry = PendingEntry::event(change, context)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO ticket_events (
                id, title, description, event_date, event_time, capacity, price,
                booked_count, soft_deleted, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(event.id())
        .bind(event.title())
        .bind(event.description())
        .bind(event.date())
        .bind(event.time())
        .bind(to_db_count(event.capacity())?)
        .bind(event.price().value())
        .bind(to_db_count(event.booked_count())?)
        .bind(event.is_soft_deleted())
        .bind(event.version())
        .bind(event.created_at())
        .bind(event.updated_at())
        .execute(&mut *tx)
        .await?;

        self.append_log(&mut tx, entry).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn get_event(&self, event_id: Uuid) -> AppResult<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM ticket_events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    async fn apply_event_command(
        &self,
        event_id: Uuid,
        command: &EventCommand,
        context: &OperationContext,
    ) -> AppResult<Event> {
        let mut tx = self.pool.begin().await?;
        let event = self.lock_event(&mut tx, event_id).await?;

        let Some(change) = event.decide(command)? else {
            // No-op: release the row lock without writing
            tx.rollback().await?;
            return Ok(event);
        };

        let entry = PendingEntry::event(&change, context)?;
        let event = event.apply(change);

        self.write_event(&mut tx, &event).await?;
        self.append_log(&mut tx, entry).await?;
        tx.commit().await?;

        Ok(event)
    }

    async fn list_active_events(&self) -> AppResult<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM ticket_events WHERE NOT soft_deleted \
             ORDER BY event_date, event_time, created_at, id",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn commit_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        event_id: Uuid,
        seats: SeatList,
        context: &OperationContext,
    ) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;
        let event = self.lock_event(&mut tx, event_id).await?;

        let taken: Vec<Vec<String>> = sqlx::query_scalar(
            "SELECT seats FROM bookings WHERE event_id = $1 AND NOT cancelled",
        )
        .bind(event_id)
        .fetch_all(&mut *tx)
        .await?;

        let opened = Booking::open(
            booking_id,
            user_id,
            seats,
            &event,
            taken.iter().flatten().map(String::as_str),
        )?;

        let booking = &opened.booking;
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, event_id, seats, price, cancelled, version, created_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7)
            "#,
        )
        .bind(booking.id())
        .bind(booking.user_id())
        .bind(booking.event_id())
        .bind(booking.seats().as_slice())
        .bind(booking.price().value())
        .bind(booking.version())
        .bind(booking.created_at())
        .execute(&mut *tx)
        .await?;

        self.write_event(&mut tx, &opened.event).await?;
        self.append_log(&mut tx, PendingEntry::booking(&opened.booking_change, context)?)
            .await?;
        self.append_log(&mut tx, PendingEntry::event(&opened.event_change, context)?)
            .await?;
        tx.commit().await?;

        Ok(opened.booking)
    }

    async fn cancel_booking(
        &self,
        booking_id: Uuid,
        context: &OperationContext,
    ) -> AppResult<Booking> {
        let Some(existing) = self.get_booking(booking_id).await? else {
            return Err(DomainError::not_found(Resource::Booking, booking_id).into());
        };

        let mut tx = self.pool.begin().await?;
        let event = self.lock_event(&mut tx, existing.event_id()).await?;

        // Re-read under the event lock: a concurrent cancel may have won
        let row: BookingRow = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await?;
        let booking = Booking::try_from(row)?;

        let Some(closed) = booking.close(&event)? else {
            tx.rollback().await?;
            return Ok(booking);
        };

        sqlx::query(
            r#"
            UPDATE bookings
            SET cancelled = TRUE, cancelled_at = $2, version = $3
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .bind(closed.booking.cancelled_at())
        .bind(closed.booking.version())
        .execute(&mut *tx)
        .await?;

        self.write_event(&mut tx, &closed.event).await?;
        self.append_log(&mut tx, PendingEntry::booking(&closed.booking_change, context)?)
            .await?;
        self.append_log(&mut tx, PendingEntry::event(&closed.event_change, context)?)
            .await?;
        tx.commit().await?;

        Ok(closed.booking)
    }

    async fn get_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings(&self, scope: BookingScope) -> AppResult<Vec<BookingView>> {
        let rows: Vec<BookingViewRow> = sqlx::query_as(
            r#"
            SELECT b.id, b.user_id, b.event_id, b.seats, b.price, b.cancelled, b.version,
                   b.created_at, b.cancelled_at,
                   u.name AS user_name, e.title AS event_title
            FROM bookings b
            JOIN users u ON u.id = b.user_id
            JOIN ticket_events e ON e.id = b.event_id
            WHERE NOT b.cancelled
              AND ($1::uuid IS NULL OR b.user_id = $1)
              AND ($2::uuid IS NULL OR b.event_id = $2)
            ORDER BY b.created_at, b.id
            "#,
        )
        .bind(scope.user_id)
        .bind(scope.event_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(BookingView {
                    booking: Booking::try_from(row.booking)?,
                    user_name: row.user_name,
                    event_title: row.event_title,
                })
            })
            .collect()
    }

    async fn audit_trail(&self, aggregate_id: Uuid) -> AppResult<Vec<AuditEntry>> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT sequence, aggregate_type, aggregate_id, change_type, payload, context, recorded_at
            FROM lifecycle_log
            WHERE aggregate_id = $1
            ORDER BY sequence
            "#,
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AuditEntry::from).collect())
    }
}
