use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, expire_reservation, get_reservation, list_reservations, request_reservation,
    return_reservation,
};

/// Creates the API router with all reservation endpoints
///
/// Command endpoints (stand-in for the external bus transport):
/// - POST /reservations/request - Apply a reservation request message
/// - POST /reservations/:number/return - Apply a return message
/// - POST /reservations/:number/expire - Apply an expire message
///
/// Query endpoints:
/// - GET /reservations - List reservations with filter + paging
/// - GET /reservations/:number - Get one reservation
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Command endpoints
        .route("/reservations/request", post(request_reservation))
        .route("/reservations/:number/return", post(return_reservation))
        .route("/reservations/:number/expire", post(expire_reservation))
        // Query endpoints
        .route("/reservations", get(list_reservations))
        .route("/reservations/:number", get(get_reservation))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
