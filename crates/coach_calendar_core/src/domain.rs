//! crates/coach_calendar_core/src/domain.rs
//!
//! Defines the pure, core data structures for the coach calendar.
//! These structs are independent of any database or serialization format.
//! All timestamps are local wall-clock values (`NaiveDateTime`).

use chrono::{Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

/// A coaching client. Owned by the persistence layer, read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub phone: String,
}

//=========================================================================================
// Call Types
//=========================================================================================

/// The closed set of call types a coach can book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    Onboarding,
    FollowUp,
}

/// Everything that is derived from a call type, kept in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTypeSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub duration_minutes: u32,
}

impl CallType {
    pub const ALL: [CallType; 2] = [CallType::Onboarding, CallType::FollowUp];

    /// The single mapping from a call type to its wire name, label and canonical duration.
    pub const fn spec(self) -> CallTypeSpec {
        match self {
            CallType::Onboarding => CallTypeSpec {
                name: "onboarding",
                label: "Onboarding (40 min)",
                duration_minutes: 40,
            },
            CallType::FollowUp => CallTypeSpec {
                name: "follow-up",
                label: "Follow-up (20 min)",
                duration_minutes: 20,
            },
        }
    }

    pub const fn duration_minutes(self) -> u32 {
        self.spec().duration_minutes
    }

    pub const fn as_str(self) -> &'static str {
        self.spec().name
    }

    pub const fn label(self) -> &'static str {
        self.spec().label
    }

    /// Follow-up calls expand into a weekly series.
    pub const fn is_recurring(self) -> bool {
        matches!(self, CallType::FollowUp)
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized call type: {0}")]
pub struct UnknownCallType(pub String);

impl FromStr for CallType {
    type Err = UnknownCallType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CallType::ALL
            .into_iter()
            .find(|call_type| call_type.as_str() == s)
            .ok_or_else(|| UnknownCallType(s.to_string()))
    }
}

//=========================================================================================
// Bookings
//=========================================================================================

/// A booking that has been planned but not yet persisted, so it has no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub client_id: String,
    pub call_type: CallType,
    pub start_time: NaiveDateTime,
    pub duration_minutes: u32,
}

impl NewBooking {
    /// The duration is fixed from the call type here and stored from then on.
    pub fn new(
        client_id: impl Into<String>,
        call_type: CallType,
        start_time: NaiveDateTime,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            call_type,
            start_time,
            duration_minutes: call_type.duration_minutes(),
        }
    }

    /// Attaches the id assigned by the persistence layer.
    pub fn into_booking(self, id: impl Into<String>) -> Booking {
        Booking {
            id: id.into(),
            client_id: self.client_id,
            call_type: self.call_type,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
        }
    }
}

/// A persisted call booking. `client_id` is a weak reference resolved by lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub call_type: CallType,
    pub start_time: NaiveDateTime,
    pub duration_minutes: u32,
}

impl Booking {
    /// Exclusive end of the booked interval.
    pub fn end_time(&self) -> NaiveDateTime {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }
}

//=========================================================================================
// Calendar Values
//=========================================================================================

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Only affects display.
    pub in_current_month: bool,
}

/// A bookable instant on a day's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
}

/// A calendar month, anchored on its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthRef {
    first: NaiveDate,
}

impl MonthRef {
    /// Returns `None` when `month` is not in `1..=12`, or when the month sits so
    /// close to the edge of the representable dates that its padded grid would not fit.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .filter(|first| Self::grid_fits(*first))
            .map(|first| Self { first })
    }

    /// The month a given date falls in, moved one month inwards for the two
    /// edge months of the representable range.
    pub fn containing(date: NaiveDate) -> Self {
        let first = date - Duration::days(i64::from(date.day0()));
        if Self::grid_fits(first) {
            return Self { first };
        }

        let inwards = if date.year() < 0 {
            first.checked_add_months(Months::new(1))
        } else {
            first.checked_sub_months(Months::new(1))
        };
        Self {
            first: inwards.unwrap_or(first),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// Saturates at the earliest supported month.
    pub fn previous(self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .filter(|first| Self::grid_fits(*first))
            .map_or(self, |first| Self { first })
    }

    /// Saturates at the latest supported month.
    pub fn next(self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .filter(|first| Self::grid_fits(*first))
            .map_or(self, |first| Self { first })
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        Self::last_day_from(self.first)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Inclusive range covering every booking that can start in this month:
    /// the first day at 00:00:00 through the last day at 23:59:59.
    pub fn booking_window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let from = self.first.and_time(NaiveTime::MIN);
        let to = self.last_day().and_time(NaiveTime::MIN) + Duration::seconds(86_399);
        (from, to)
    }

    fn last_day_from(first: NaiveDate) -> NaiveDate {
        first
            .checked_add_months(Months::new(1))
            .and_then(|next_first| next_first.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// A Sunday-first grid borrows at most six days on either side of the month.
    fn grid_fits(first: NaiveDate) -> bool {
        first.checked_sub_days(Days::new(6)).is_some()
            && Self::last_day_from(first)
                .checked_add_days(Days::new(6))
                .is_some()
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn call_type_round_trips_through_its_wire_name() {
        assert_eq!("onboarding".parse::<CallType>(), Ok(CallType::Onboarding));
        assert_eq!("follow-up".parse::<CallType>(), Ok(CallType::FollowUp));
        assert_eq!(
            "followup".parse::<CallType>(),
            Err(UnknownCallType("followup".to_string()))
        );
    }

    #[test]
    fn new_booking_takes_duration_from_call_type() {
        let start = ymd(2024, 3, 1).and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(NewBooking::new("c1", CallType::Onboarding, start).duration_minutes, 40);
        assert_eq!(NewBooking::new("c1", CallType::FollowUp, start).duration_minutes, 20);
    }

    #[test]
    fn booking_end_time_uses_stored_duration() {
        let start = ymd(2024, 3, 1).and_hms_opt(10, 30, 0).unwrap();
        let mut booking = NewBooking::new("c1", CallType::Onboarding, start).into_booking("b1");
        assert_eq!(booking.end_time(), ymd(2024, 3, 1).and_hms_opt(11, 10, 0).unwrap());

        booking.duration_minutes = 25;
        assert_eq!(booking.end_time(), ymd(2024, 3, 1).and_hms_opt(10, 55, 0).unwrap());
    }

    #[test]
    fn month_navigation_rolls_over_years() {
        let december = MonthRef::new(2023, 12).unwrap();
        assert_eq!(december.next(), MonthRef::new(2024, 1).unwrap());
        assert_eq!(MonthRef::new(2024, 1).unwrap().previous(), december);
        assert_eq!(
            MonthRef::containing(ymd(2024, 2, 17)),
            MonthRef::new(2024, 2).unwrap()
        );
        assert!(MonthRef::new(2024, 13).is_none());
    }

    #[test]
    fn edge_months_of_the_date_range_are_not_supported() {
        assert!(MonthRef::new(NaiveDate::MAX.year(), NaiveDate::MAX.month()).is_none());

        let earliest = MonthRef::containing(NaiveDate::MIN);
        let latest = MonthRef::containing(NaiveDate::MAX);
        assert!(MonthRef::new(earliest.year(), earliest.month()).is_some());
        assert!(MonthRef::new(latest.year(), latest.month()).is_some());
        assert_eq!(earliest.previous(), earliest);
        assert_eq!(latest.next(), latest);
    }

    #[test]
    fn month_lengths_follow_the_calendar() {
        assert_eq!(MonthRef::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthRef::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthRef::new(2024, 12).unwrap().last_day(), ymd(2024, 12, 31));
    }

    #[test]
    fn booking_window_spans_the_whole_month() {
        let (from, to) = MonthRef::new(2024, 4).unwrap().booking_window();
        assert_eq!(from, ymd(2024, 4, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(to, ymd(2024, 4, 30).and_hms_opt(23, 59, 59).unwrap());
    }
}
