//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{Aggregate, Booking, Event, User};
use crate::audit::AuditEntry;
use crate::domain::{OperationContext, Role};
use crate::error::AppError;
use crate::handlers::{
    CreateBookingCommand, CreateEventCommand, RegisterUserCommand, UpdateEventCommand,
};
use crate::query::BookingFilter;
use crate::store::BookingView;

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            phone: user.phone().to_string(),
            role: user.role(),
            created_at: user.created_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub capacity: u32,
    pub price: Decimal,
    pub booked_count: u32,
    pub remaining_capacity: u32,
    pub soft_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id(),
            title: event.title().to_string(),
            description: event.description().to_string(),
            date: event.date(),
            time: event.time(),
            capacity: event.capacity(),
            price: event.price().value(),
            booked_count: event.booked_count(),
            remaining_capacity: event.remaining_capacity(),
            soft_deleted: event.is_soft_deleted(),
            created_at: event.created_at(),
            updated_at: event.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub seats: Vec<String>,
    /// Total for all seats, fixed at booking time
    pub price: Decimal,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id(),
            user_id: booking.user_id(),
            event_id: booking.event_id(),
            seats: booking.seats().as_slice().to_vec(),
            price: booking.price().value(),
            cancelled: booking.is_cancelled(),
            created_at: booking.created_at(),
            cancelled_at: booking.cancelled_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingSearchResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub user_name: String,
    pub event_title: String,
}

impl From<BookingView> for BookingSearchResponse {
    fn from(view: BookingView) -> Self {
        Self {
            booking: view.booking.into(),
            user_name: view.user_name,
            event_title: view.event_title,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventListParams {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingSearchParams {
    #[serde(default)]
    pub term: Option<String>,
}

// =========================================================================
// Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", post(register_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/bookings", get(list_user_bookings))
        // Events
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).patch(update_event).delete(delete_event),
        )
        // Bookings
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/search", get(search_bookings))
        .route("/bookings/:id", get(get_booking).delete(cancel_booking))
        // Audit
        .route("/audit/:id", get(get_audit_trail))
}

// =========================================================================
// User handlers
// =========================================================================

/// POST /users - Register a user
async fn register_user(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<RegisterUserCommand>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.users.register_user(command, &context).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/:id - Own profile, or any profile for an admin
async fn get_user(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    context.require_owner_or_admin(user_id)?;
    let user = state.users.get_user(user_id).await?;
    Ok(Json(user.into()))
}

/// GET /users/:id/bookings - Active bookings of one user
async fn list_user_bookings(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = state.ledger.list_bookings_for_user(user_id, &context).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

// =========================================================================
// Event handlers
// =========================================================================

/// GET /events - Active events, optionally filtered by title
async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = match params.search.as_deref() {
        Some(term) => state.query.search_events(term).await?,
        None => state.query.list_active_events().await?,
    };
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// POST /events - Schedule an event (admin)
async fn create_event(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<CreateEventCommand>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let event = state.registry.create_event(command, &context).await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

/// GET /events/:id - Any event, including withdrawn ones
async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state.registry.get_event(event_id).await?;
    Ok(Json(event.into()))
}

/// PATCH /events/:id - Partial update (admin)
async fn update_event(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(event_id): Path<Uuid>,
    Json(command): Json<UpdateEventCommand>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state
        .registry
        .update_event(event_id, command, &context)
        .await?;
    Ok(Json(event.into()))
}

/// DELETE /events/:id - Soft delete (admin)
async fn delete_event(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.registry.soft_delete_event(event_id, &context).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Booking handlers
// =========================================================================

/// POST /bookings - Book seats
async fn create_booking(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<CreateBookingCommand>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let booking = state.ledger.create_booking(command, &context).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// GET /bookings - Active bookings, scoped to the caller unless admin
async fn list_bookings(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = state.query.list_active_bookings(&context, filter).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// GET /bookings/search - Admin search by id, user name or event title
async fn search_bookings(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(params): Query<BookingSearchParams>,
) -> Result<Json<Vec<BookingSearchResponse>>, AppError> {
    let views = state
        .query
        .search_bookings(&context, params.term.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// GET /bookings/:id
async fn get_booking(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.ledger.get_booking(booking_id, &context).await?;
    Ok(Json(booking.into()))
}

/// DELETE /bookings/:id - Cancel (idempotent)
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.ledger.cancel_booking(booking_id, &context).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Audit handlers
// =========================================================================

/// GET /audit/:id - Lifecycle trail of an event, booking or user (admin)
async fn get_audit_trail(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(aggregate_id): Path<Uuid>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let entries = state.audit.trail(&context, aggregate_id).await?;
    Ok(Json(entries))
}
