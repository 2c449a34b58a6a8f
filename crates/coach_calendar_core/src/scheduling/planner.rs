//! crates/coach_calendar_core/src/scheduling/planner.rs
//!
//! Decides whether a booking request can be accepted and, if so, which
//! concrete bookings have to be created for it. Nothing here touches storage;
//! the host executes the returned plan against a `BookingStore`.

use chrono::{Days, Duration, Months, NaiveDate, NaiveDateTime};
use std::iter;
use tracing::debug;

use crate::domain::{Booking, CallType, NewBooking};

//=========================================================================================
// Errors and Results
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The candidate conflicts with an existing booking; pick another slot.
    #[error("slot overlaps existing booking")]
    OverlapRejected,
    /// The request is incomplete or malformed; the caller must re-prompt.
    #[error("Invalid booking request: {0}")]
    InvalidRequest(String),
}

/// `Ok` is the accepted plan, `Err` the rejection with its reason.
pub type PlanResult = Result<BookingPlan, PlanError>;

//=========================================================================================
// Requests
//=========================================================================================

/// Raw, possibly incomplete booking input as it arrives from a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub client_id: Option<String>,
    pub call_type: Option<String>,
    pub start_time: Option<NaiveDateTime>,
}

/// A complete booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub client_id: String,
    pub call_type: CallType,
    pub start_time: NaiveDateTime,
}

impl BookingRequest {
    pub fn candidate(&self) -> Candidate {
        Candidate {
            start_time: self.start_time,
            duration_minutes: self.call_type.duration_minutes(),
        }
    }
}

impl TryFrom<BookingDraft> for BookingRequest {
    type Error = PlanError;

    fn try_from(draft: BookingDraft) -> Result<Self, Self::Error> {
        let client_id = draft
            .client_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PlanError::InvalidRequest("a client must be selected".to_string()))?;

        let start_time = draft
            .start_time
            .ok_or_else(|| PlanError::InvalidRequest("a start time must be selected".to_string()))?;

        let call_type = draft
            .call_type
            .ok_or_else(|| PlanError::InvalidRequest("a call type must be selected".to_string()))?
            .parse::<CallType>()
            .map_err(|e| PlanError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client_id,
            call_type,
            start_time,
        })
    }
}

/// The interval a proposed booking would occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub start_time: NaiveDateTime,
    pub duration_minutes: u32,
}

impl Candidate {
    pub fn end_time(&self) -> NaiveDateTime {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }
}

//=========================================================================================
// Plans
//=========================================================================================

/// The bookings to create for an accepted request, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPlan {
    pub bookings: Vec<NewBooking>,
}

impl BookingPlan {
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn into_bookings(self) -> Vec<NewBooking> {
        self.bookings
    }
}

/// A request for the store to remove a single booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub booking_id: String,
}

//=========================================================================================
// Engine Operations
//=========================================================================================

/// Bookings whose start time falls on `date`.
pub fn bookings_on<'a>(
    date: NaiveDate,
    bookings: &'a [Booking],
) -> impl Iterator<Item = &'a Booking> + 'a {
    bookings.iter().filter(move |booking| booking.date() == date)
}

/// Half-open overlap test: `[start, end)` against each existing booking.
///
/// A candidate conflicts if it starts inside an existing call, ends inside one,
/// or swallows one whole. Back-to-back calls do not conflict.
pub fn has_overlap(candidate: &Candidate, existing_on_same_date: &[Booking]) -> bool {
    let new_start = candidate.start_time;
    let new_end = candidate.end_time();

    existing_on_same_date.iter().any(|existing| {
        let existing_start = existing.start_time;
        let existing_end = existing.end_time();

        (new_start >= existing_start && new_start < existing_end)
            || (new_end > existing_start && new_end <= existing_end)
            || (new_start <= existing_start && new_end >= existing_end)
    })
}

/// Plans the bookings for `request` against a snapshot of existing bookings.
///
/// `existing` may hold more than the candidate's day; only bookings on the same
/// calendar date are checked. A follow-up expands into weekly occurrences from
/// the requested start while strictly before the same instant one calendar
/// year later. Only the first occurrence is checked for overlaps.
pub fn plan_booking(request: &BookingRequest, existing: &[Booking]) -> PlanResult {
    let candidate = request.candidate();
    let same_day: Vec<Booking> = bookings_on(request.start_time.date(), existing)
        .cloned()
        .collect();

    if has_overlap(&candidate, &same_day) {
        debug!(
            start = %request.start_time,
            call_type = %request.call_type,
            "Booking request overlaps an existing booking"
        );
        return Err(PlanError::OverlapRejected);
    }

    let starts = if request.call_type.is_recurring() {
        weekly_for_one_year(request.start_time)
    } else {
        vec![request.start_time]
    };

    let bookings: Vec<NewBooking> = starts
        .into_iter()
        .map(|start| NewBooking::new(request.client_id.clone(), request.call_type, start))
        .collect();

    debug!(
        client_id = %request.client_id,
        call_type = %request.call_type,
        occurrences = bookings.len(),
        "Booking request accepted"
    );
    Ok(BookingPlan { bookings })
}

/// Plans the removal of one booking. Other occurrences of its series are untouched.
pub fn plan_deletion(booking_id: impl Into<String>) -> DeletionRequest {
    DeletionRequest {
        booking_id: booking_id.into(),
    }
}

fn weekly_for_one_year(start: NaiveDateTime) -> Vec<NaiveDateTime> {
    let Some(until) = start.checked_add_months(Months::new(12)) else {
        return vec![start];
    };

    iter::successors(Some(start), |previous| previous.checked_add_days(Days::new(7)))
        .take_while(|occurrence| *occurrence < until)
        .collect()
}
