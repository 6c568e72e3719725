//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tokio::sync::OnceCell;
use tower::util::ServiceExt;
use uuid::Uuid;

use ticket_desk::api::{self, AppState};
use ticket_desk::store::{MemoryStore, Store};

pub const ADMIN_ID: &str = "00000000-0000-0000-0000-0000000000ad";

pub fn admin_id() -> Uuid {
    Uuid::parse_str(ADMIN_ID).unwrap()
}

/// App over a fresh in-memory store with the admin seeded
pub async fn memory_app() -> Router {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let state = AppState::new(store);
    state
        .users
        .ensure_admin(admin_id(), "Test Admin", "admin@ticketdesk.test", "9000000000")
        .await
        .expect("Failed to seed admin");
    api::build_app(state)
}

/// Send one request, returning status and parsed JSON body (Null if empty)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    caller: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(caller) = caller {
        builder = builder.header("X-Request-User-Id", caller.to_string());
    }

    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

static SCHEMA: OnceCell<()> = OnceCell::const_new();

/// Connect to DATABASE_URL and apply the schema once per test binary.
///
/// Tables are not truncated: every test works with fresh ids and emails.
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    SCHEMA
        .get_or_init(|| async {
            pool.execute(include_str!("../../migrations/0001_init.sql"))
                .await
                .expect("Failed to apply schema");
        })
        .await;

    pool
}

/// Email that no other test run has used
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@ticketdesk.test", prefix, Uuid::new_v4().simple())
}
