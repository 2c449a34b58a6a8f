//! services/api/src/booking_flow.rs
//!
//! The calendar use cases: they read snapshots from a `BookingStore`, hand them
//! to the scheduling engine, and carry out the resulting plans. The engine
//! itself never touches the store.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use coach_calendar_core::domain::{Booking, CalendarDay, Client, MonthRef};
use coach_calendar_core::ports::{BookingStore, PortError};
use coach_calendar_core::scheduling::{
    bookings_on, build_month_grid, plan_booking, plan_deletion, slot_availability, BookingDraft,
    BookingRequest, PlanError, SlotAvailability,
};
use futures::future::join_all;
use tracing::{error, info, warn};

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The engine rejected the request (overlap or invalid input).
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Unknown client: {0}")]
    UnknownClient(String),

    /// The store failed; nothing about the outcome can be assumed.
    #[error(transparent)]
    Port(#[from] PortError),
}

//=========================================================================================
// Views and Reports
//=========================================================================================

/// One grid cell together with the bookings that start on it.
#[derive(Debug, Clone)]
pub struct DayCell {
    pub day: CalendarDay,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone)]
pub struct MonthView {
    pub month: MonthRef,
    pub days: Vec<DayCell>,
    pub clients: Vec<Client>,
}

/// A booking with its client's name resolved, if the client still exists.
#[derive(Debug, Clone)]
pub struct BookingEntry {
    pub booking: Booking,
    pub client_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DayView {
    pub date: NaiveDate,
    pub bookings: Vec<BookingEntry>,
    pub slots: Vec<SlotAvailability>,
}

/// Outcome of persisting a plan. Each booking is created independently, so a
/// batch can end up partially written.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub requested: usize,
    pub created: Vec<Booking>,
    pub failures: Vec<String>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.created.len() == self.requested
    }

    pub fn nothing_created(&self) -> bool {
        self.created.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("{} of {} calls booked", self.created.len(), self.requested)
    }
}

//=========================================================================================
// Use Cases
//=========================================================================================

/// The month grid with each day's bookings, plus the client list for display.
pub async fn month_view(store: &dyn BookingStore, month: MonthRef) -> Result<MonthView, FlowError> {
    let clients = store.list_clients().await?;
    let (from, to) = month.booking_window();
    let bookings = store.list_bookings_between(from, to).await?;

    let days = build_month_grid(month.first_day())
        .into_iter()
        .map(|day| DayCell {
            day,
            bookings: bookings_on(day.date, &bookings).cloned().collect(),
        })
        .collect();

    Ok(MonthView {
        month,
        days,
        clients,
    })
}

/// The bookings and the slot availability of a single date.
pub async fn day_view(store: &dyn BookingStore, date: NaiveDate) -> Result<DayView, FlowError> {
    let clients = store.list_clients().await?;
    let (from, to) = day_window(date);
    let bookings = store.list_bookings_between(from, to).await?;

    let slots = slot_availability(date, &bookings);
    let bookings = bookings
        .into_iter()
        .map(|booking| {
            let client_name = clients
                .iter()
                .find(|c| c.id == booking.client_id)
                .map(|c| c.name.clone());
            BookingEntry {
                booking,
                client_name,
            }
        })
        .collect();

    Ok(DayView {
        date,
        bookings,
        slots,
    })
}

/// Validates and plans a booking against a fresh snapshot of its date, then
/// creates every planned booking.
pub async fn submit_booking(
    store: &dyn BookingStore,
    draft: BookingDraft,
) -> Result<BatchReport, FlowError> {
    let request = BookingRequest::try_from(draft)?;

    let clients = store.list_clients().await?;
    if !clients.iter().any(|c| c.id == request.client_id) {
        return Err(FlowError::UnknownClient(request.client_id));
    }

    let (from, to) = day_window(request.start_time.date());
    let existing = store.list_bookings_between(from, to).await?;

    let plan = plan_booking(&request, &existing).map_err(|e| {
        warn!(
            client_id = %request.client_id,
            start = %request.start_time,
            "Booking request rejected: {}",
            e
        );
        e
    })?;

    let requested = plan.len();
    let results = join_all(
        plan.into_bookings()
            .into_iter()
            .map(|booking| store.create_booking(booking)),
    )
    .await;

    let mut created = Vec::with_capacity(requested);
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(booking) => created.push(booking),
            Err(e) => {
                error!("Failed to create booking: {:?}", e);
                failures.push(e.to_string());
            }
        }
    }

    let report = BatchReport {
        requested,
        created,
        failures,
    };
    if report.is_complete() {
        info!(
            client_id = %request.client_id,
            call_type = %request.call_type,
            "{}",
            report.summary()
        );
    } else {
        warn!(client_id = %request.client_id, "Partial booking batch: {}", report.summary());
    }
    Ok(report)
}

/// Deletes exactly one booking; sibling occurrences of a series stay in place.
pub async fn cancel_booking(store: &dyn BookingStore, booking_id: &str) -> Result<(), FlowError> {
    let deletion = plan_deletion(booking_id);
    store.delete_booking(&deletion.booking_id).await?;
    info!(booking_id = %deletion.booking_id, "Booking deleted");
    Ok(())
}

/// Inclusive range covering every start time on `date`.
fn day_window(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let from = date.and_time(NaiveTime::MIN);
    (from, from + Duration::seconds(86_399))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryBookingStore;
    use async_trait::async_trait;
    use coach_calendar_core::domain::{CallType, NewBooking};
    use coach_calendar_core::ports::PortResult;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn clients() -> Vec<Client> {
        vec![
            Client {
                id: "c1".to_string(),
                name: "Asha".to_string(),
                phone: "555-0101".to_string(),
            },
            Client {
                id: "c2".to_string(),
                name: "Bruno".to_string(),
                phone: "555-0102".to_string(),
            },
        ]
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn draft(client: &str, call_type: &str, start: NaiveDateTime) -> BookingDraft {
        BookingDraft {
            client_id: Some(client.to_string()),
            call_type: Some(call_type.to_string()),
            start_time: Some(start),
        }
    }

    /// Wraps the memory store and fails every `fail_every`-th create.
    struct FlakyStore {
        inner: MemoryBookingStore,
        creates: AtomicUsize,
        fail_every: usize,
    }

    #[async_trait]
    impl BookingStore for FlakyStore {
        async fn list_clients(&self) -> PortResult<Vec<Client>> {
            self.inner.list_clients().await
        }

        async fn list_bookings_between(
            &self,
            from: NaiveDateTime,
            to: NaiveDateTime,
        ) -> PortResult<Vec<Booking>> {
            self.inner.list_bookings_between(from, to).await
        }

        async fn create_booking(&self, booking: NewBooking) -> PortResult<Booking> {
            let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
            if n % self.fail_every == 0 {
                return Err(PortError::Unexpected("write quota exceeded".to_string()));
            }
            self.inner.create_booking(booking).await
        }

        async fn delete_booking(&self, booking_id: &str) -> PortResult<()> {
            self.inner.delete_booking(booking_id).await
        }
    }

    #[tokio::test]
    async fn onboarding_creates_one_booking() {
        let store = MemoryBookingStore::with_clients(clients());
        let report = submit_booking(&store, draft("c1", "onboarding", at(2024, 3, 1, 10, 30)))
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].duration_minutes, 40);
        assert!(!report.created[0].id.is_empty());
        assert_eq!(store.booking_count().await, 1);
    }

    #[tokio::test]
    async fn follow_up_creates_a_year_of_weekly_bookings() {
        let store = MemoryBookingStore::with_clients(clients());
        let report = submit_booking(&store, draft("c2", "follow-up", at(2024, 3, 1, 11, 10)))
            .await
            .unwrap();

        assert_eq!(report.requested, 53);
        assert_eq!(report.summary(), "53 of 53 calls booked");
        assert_eq!(store.booking_count().await, 53);
    }

    #[tokio::test]
    async fn overlap_is_rejected_without_writing() {
        let store = MemoryBookingStore::with_clients(clients());
        submit_booking(&store, draft("c1", "onboarding", at(2024, 3, 1, 10, 30)))
            .await
            .unwrap();

        let err = submit_booking(&store, draft("c2", "follow-up", at(2024, 3, 1, 11, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Plan(PlanError::OverlapRejected)));
        assert_eq!(store.booking_count().await, 1);

        let report = submit_booking(&store, draft("c2", "onboarding", at(2024, 3, 1, 11, 10)))
            .await
            .unwrap();
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn unknown_client_is_rejected() {
        let store = MemoryBookingStore::with_clients(clients());
        let err = submit_booking(&store, draft("c9", "onboarding", at(2024, 3, 1, 10, 30)))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::UnknownClient(id) if id == "c9"));
    }

    #[tokio::test]
    async fn partial_failures_are_reported() {
        let store = FlakyStore {
            inner: MemoryBookingStore::with_clients(clients()),
            creates: AtomicUsize::new(0),
            fail_every: 5,
        };
        let report = submit_booking(&store, draft("c1", "follow-up", at(2024, 3, 1, 10, 30)))
            .await
            .unwrap();

        assert_eq!(report.requested, 53);
        assert_eq!(report.failures.len(), 10);
        assert_eq!(report.summary(), "43 of 53 calls booked");
        assert!(!report.is_complete());
        assert!(!report.nothing_created());
    }

    #[tokio::test]
    async fn deleting_one_occurrence_keeps_its_siblings() {
        let store = MemoryBookingStore::with_clients(clients());
        let report = submit_booking(&store, draft("c1", "follow-up", at(2024, 3, 1, 10, 30)))
            .await
            .unwrap();

        let second = report.created[1].clone();
        cancel_booking(&store, &second.id).await.unwrap();

        assert_eq!(store.booking_count().await, 52);
        let march = month_view(&store, MonthRef::new(2024, 3).unwrap()).await.unwrap();
        let remaining: Vec<_> = march
            .days
            .iter()
            .flat_map(|cell| cell.bookings.iter())
            .collect();
        assert!(remaining.iter().all(|b| b.id != second.id));
        assert!(remaining.iter().any(|b| b.id == report.created[0].id));
        assert!(remaining.iter().any(|b| b.id == report.created[2].id));

        assert!(matches!(
            cancel_booking(&store, &second.id).await,
            Err(FlowError::Port(PortError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn month_view_attaches_bookings_to_their_days() {
        let store = MemoryBookingStore::with_clients(clients());
        submit_booking(&store, draft("c1", "onboarding", at(2024, 3, 15, 12, 10)))
            .await
            .unwrap();

        let view = month_view(&store, MonthRef::new(2024, 3).unwrap()).await.unwrap();
        assert_eq!(view.days.len() % 7, 0);
        assert_eq!(view.clients.len(), 2);

        let booked: Vec<_> = view.days.iter().filter(|cell| !cell.bookings.is_empty()).collect();
        assert_eq!(booked.len(), 1);
        assert_eq!(booked[0].day.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[tokio::test]
    async fn day_view_resolves_clients_and_marks_slots() {
        let store = MemoryBookingStore::with_clients(clients());
        store
            .create_booking(NewBooking::new("gone", CallType::FollowUp, at(2024, 3, 1, 19, 30)))
            .await
            .unwrap();
        submit_booking(&store, draft("c2", "onboarding", at(2024, 3, 1, 10, 30)))
            .await
            .unwrap();

        let view = day_view(&store, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = view.bookings.iter().map(|e| e.client_name.clone()).collect();
        assert_eq!(names, vec![Some("Bruno".to_string()), None]);

        assert_eq!(view.slots.len(), 28);
        assert!(view.slots[0].booked);
        assert!(view.slots[27].booked);
        assert_eq!(view.slots.iter().filter(|s| s.booked).count(), 2);
    }
}
