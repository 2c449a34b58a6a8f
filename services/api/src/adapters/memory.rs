//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the `BookingStore` port. Used when no
//! database is configured and as the store behind the test suites.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use coach_calendar_core::domain::{Booking, Client, NewBooking};
use coach_calendar_core::ports::{BookingStore, PortError, PortResult};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    clients: Vec<Client>,
    bookings: Vec<Booking>,
}

/// Keeps clients and bookings in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryBookingStore {
    state: RwLock<MemoryState>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already knows the given clients.
    pub fn with_clients(clients: Vec<Client>) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                clients,
                bookings: Vec::new(),
            }),
        }
    }

    pub async fn booking_count(&self) -> usize {
        self.state.read().await.bookings.len()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn list_clients(&self) -> PortResult<Vec<Client>> {
        let mut clients = self.state.read().await.clients.clone();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn list_bookings_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> PortResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| b.start_time >= from && b.start_time <= to)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    async fn create_booking(&self, booking: NewBooking) -> PortResult<Booking> {
        let booking = booking.into_booking(Uuid::new_v4().to_string());
        self.state.write().await.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn delete_booking(&self, booking_id: &str) -> PortResult<()> {
        let mut state = self.state.write().await;
        let position = state
            .bookings
            .iter()
            .position(|b| b.id == booking_id)
            .ok_or_else(|| PortError::NotFound(format!("Booking {} not found", booking_id)))?;
        state.bookings.remove(position);
        Ok(())
    }
}
