pub mod rest;
pub mod state;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub use rest::{
    cancel_booking_handler, create_booking_handler, day_handler, list_clients_handler,
    month_handler,
};
use state::AppState;

/// All calendar routes, bound to the shared state.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/clients", get(list_clients_handler))
        .route("/calendar/{year}/{month}", get(month_handler))
        .route("/days/{date}", get(day_handler))
        .route("/bookings", post(create_booking_handler))
        .route("/bookings/{booking_id}", delete(cancel_booking_handler))
        .with_state(app_state)
}
