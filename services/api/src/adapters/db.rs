//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `BookingStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use coach_calendar_core::domain::{Booking, CallType, Client, NewBooking};
use coach_calendar_core::ports::{BookingStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `BookingStore` port.
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    /// Creates a new `PgBookingStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ClientRecord {
    id: String,
    name: String,
    phone: String,
}
impl ClientRecord {
    fn to_domain(self) -> Client {
        Client {
            id: self.id,
            name: self.name,
            phone: self.phone,
        }
    }
}

#[derive(FromRow)]
struct BookingRecord {
    id: String,
    client_id: String,
    call_type: String,
    start_time: NaiveDateTime,
    duration_minutes: i32,
}
impl BookingRecord {
    fn to_domain(self) -> PortResult<Booking> {
        let call_type = self
            .call_type
            .parse::<CallType>()
            .map_err(|e| PortError::Unexpected(format!("Booking {}: {}", self.id, e)))?;
        let duration_minutes = u32::try_from(self.duration_minutes).map_err(|_| {
            PortError::Unexpected(format!(
                "Booking {} has a negative duration: {}",
                self.id, self.duration_minutes
            ))
        })?;

        Ok(Booking {
            id: self.id,
            client_id: self.client_id,
            call_type,
            start_time: self.start_time,
            duration_minutes,
        })
    }
}

//=========================================================================================
// `BookingStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn list_clients(&self) -> PortResult<Vec<Client>> {
        let records = sqlx::query_as::<_, ClientRecord>(
            "SELECT id, name, phone FROM clients ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let clients = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(clients)
    }

    async fn list_bookings_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> PortResult<Vec<Booking>> {
        let records = sqlx::query_as::<_, BookingRecord>(
            "SELECT id, client_id, call_type, start_time, duration_minutes FROM bookings \
             WHERE start_time >= $1 AND start_time <= $2 ORDER BY start_time ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn create_booking(&self, booking: NewBooking) -> PortResult<Booking> {
        let duration_minutes = i32::try_from(booking.duration_minutes)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, BookingRecord>(
            "INSERT INTO bookings (id, client_id, call_type, start_time, duration_minutes) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, client_id, call_type, start_time, duration_minutes",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&booking.client_id)
        .bind(booking.call_type.as_str())
        .bind(booking.start_time)
        .bind(duration_minutes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        record.to_domain()
    }

    async fn delete_booking(&self, booking_id: &str) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Booking {} not found", booking_id)));
        }
        Ok(())
    }
}
