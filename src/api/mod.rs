//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::audit::AuditService;
use crate::handlers::{BookingLedger, EventRegistry, UserDirectory};
use crate::query::QueryService;
use crate::store::Store;

pub use routes::create_router;

/// Shared handlers, all backed by one store
#[derive(Clone)]
pub struct AppState {
    pub users: UserDirectory,
    pub registry: EventRegistry,
    pub ledger: BookingLedger,
    pub query: QueryService,
    pub audit: AuditService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            users: UserDirectory::new(store.clone()),
            registry: EventRegistry::new(store.clone()),
            ledger: BookingLedger::new(store.clone()),
            query: QueryService::new(store.clone()),
            audit: AuditService::new(store),
        }
    }
}

/// Build the application router
pub fn build_app(state: AppState) -> Router {
    // Axum layers run last-added first: logging -> context -> handler
    let api_routes = create_router()
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::context_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    Router::new()
        // Health check (no caller)
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
