//! crates/coach_calendar_core/src/ports.rs
//!
//! Defines the storage contract the scheduling engine's host depends on.
//! This trait forms the boundary of the hexagonal architecture, so the core
//! stays independent of the concrete document store or database.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::{Booking, Client, NewBooking};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait BookingStore: Send + Sync {
    // --- Clients ---
    async fn list_clients(&self) -> PortResult<Vec<Client>>;

    // --- Bookings ---
    /// All bookings whose start time lies in `from..=to`, ordered by start time.
    async fn list_bookings_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> PortResult<Vec<Booking>>;

    /// Persists one booking and returns it with its assigned id.
    async fn create_booking(&self, booking: NewBooking) -> PortResult<Booking>;

    /// Removes exactly one booking. Fails with `NotFound` if the id is unknown.
    async fn delete_booking(&self, booking_id: &str) -> PortResult<()>;
}
