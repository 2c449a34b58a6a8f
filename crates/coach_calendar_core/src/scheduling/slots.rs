//! Bookable time slots within the coach's working window.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::domain::{Booking, TimeSlot};

/// 10:30, in minutes after midnight.
pub const DAY_OPENS_AT_MINUTE: u32 = 10 * 60 + 30;
/// 19:30, in minutes after midnight. The last slot starts exactly here.
pub const DAY_CLOSES_AT_MINUTE: u32 = 19 * 60 + 30;
pub const SLOT_STEP_MINUTES: u32 = 20;

/// Slot start times for `date`, from opening to closing inclusive.
///
/// Each slot is computed from its own minute offset, so there is no drift
/// from accumulating additions.
pub fn build_day_slots(date: NaiveDate) -> Vec<TimeSlot> {
    let midnight = date.and_time(NaiveTime::MIN);

    (DAY_OPENS_AT_MINUTE..=DAY_CLOSES_AT_MINUTE)
        .step_by(SLOT_STEP_MINUTES as usize)
        .map(|minute| TimeSlot {
            start: midnight + Duration::minutes(i64::from(minute)),
        })
        .collect()
}

/// A slot together with whether an existing booking already starts at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAvailability {
    pub slot: TimeSlot,
    pub booked: bool,
}

/// The day's slots, each flagged when some booking starts at that exact instant.
///
/// Only exact start matches are flagged; a slot covered by the tail of a longer
/// call stays selectable and is caught by the overlap check on submission.
pub fn slot_availability(date: NaiveDate, existing: &[Booking]) -> Vec<SlotAvailability> {
    build_day_slots(date)
        .into_iter()
        .map(|slot| SlotAvailability {
            slot,
            booked: existing.iter().any(|booking| booking.start_time == slot.start),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CallType, NewBooking};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn working_day_has_twenty_eight_slots() {
        let slots = build_day_slots(day());
        assert_eq!(slots.len(), 28);
        assert_eq!(slots[0].start, day().and_hms_opt(10, 30, 0).unwrap());
        assert_eq!(slots[27].start, day().and_hms_opt(19, 30, 0).unwrap());
        assert!(slots
            .windows(2)
            .all(|pair| pair[1].start - pair[0].start == Duration::minutes(20)));
    }

    #[test]
    fn only_exact_starts_are_marked_booked() {
        let existing = vec![
            NewBooking::new("c1", CallType::Onboarding, day().and_hms_opt(10, 30, 0).unwrap())
                .into_booking("b1"),
        ];
        let availability = slot_availability(day(), &existing);

        assert!(availability[0].booked);
        // 10:50 lies inside the 40-minute call but is not its start.
        assert!(!availability[1].booked);
        assert_eq!(availability.iter().filter(|a| a.booked).count(), 1);
    }
}
