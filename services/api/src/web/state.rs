//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use coach_calendar_core::ports::BookingStore;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Holds no calendar data itself: every request reads a fresh snapshot from the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
}
