//! End-to-end properties of the public scheduling API.

use chrono::{Datelike, Duration, Months, NaiveDate};
use coach_calendar_core::{
    build_day_slots, build_month_grid, plan_booking, BookingDraft, BookingRequest, CallType,
    MonthRef, NewBooking, PlanError,
};

#[test]
fn every_month_grid_is_whole_weeks_without_gaps() {
    for year in 1999..=2031 {
        for month in 1..=12 {
            let month_ref = MonthRef::new(year, month).unwrap();
            let grid = build_month_grid(month_ref.first_day());

            assert!(!grid.is_empty());
            assert_eq!(grid.len() % 7, 0, "{month_ref}");
            assert_eq!(grid[0].date.weekday().num_days_from_sunday(), 0, "{month_ref}");
            assert!(grid
                .windows(2)
                .all(|pair| pair[1].date - pair[0].date == Duration::days(1)));

            let current: Vec<NaiveDate> = grid
                .iter()
                .filter(|day| day.in_current_month)
                .map(|day| day.date)
                .collect();
            let expected: Vec<NaiveDate> = month_ref
                .first_day()
                .iter_days()
                .take_while(|date| month_ref.contains(*date))
                .collect();
            assert_eq!(current, expected, "{month_ref}");
        }
    }
}

#[test]
fn slots_ignore_the_time_of_day_of_the_input() {
    let date = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
    let slots = build_day_slots(date);

    assert_eq!(slots.len(), 28);
    assert!(slots.iter().all(|slot| slot.start.date() == date));
    assert_eq!(slots.first().unwrap().start.format("%H:%M").to_string(), "10:30");
    assert_eq!(slots.last().unwrap().start.format("%H:%M").to_string(), "19:30");
}

#[test]
fn follow_up_series_stays_within_one_year_for_any_start() {
    let mut start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .and_hms_opt(14, 50, 0)
        .unwrap();

    for _ in 0..800 {
        let request = BookingRequest {
            client_id: "client-1".to_string(),
            call_type: CallType::FollowUp,
            start_time: start,
        };
        let bookings = plan_booking(&request, &[]).unwrap().into_bookings();
        let year_later = start.checked_add_months(Months::new(12)).unwrap();

        assert!((52..=53).contains(&bookings.len()));
        assert_eq!(bookings[0].start_time, start);
        let last = bookings.last().unwrap().start_time;
        assert!(last < year_later);
        assert!(last + Duration::days(7) >= year_later);
        assert!(bookings.iter().all(|b| b.duration_minutes == 20 && b.client_id == "client-1"));

        start += Duration::days(1);
    }
}

#[test]
fn scenario_from_the_booking_form() {
    let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let existing = vec![
        NewBooking::new("client-1", CallType::Onboarding, day.and_hms_opt(10, 30, 0).unwrap())
            .into_booking("existing"),
    ];

    let clashing = BookingRequest::try_from(BookingDraft {
        client_id: Some("client-2".to_string()),
        call_type: Some("follow-up".to_string()),
        start_time: day.and_hms_opt(11, 0, 0),
    })
    .unwrap();
    assert_eq!(plan_booking(&clashing, &existing), Err(PlanError::OverlapRejected));

    let back_to_back = BookingRequest::try_from(BookingDraft {
        client_id: Some("client-2".to_string()),
        call_type: Some("onboarding".to_string()),
        start_time: day.and_hms_opt(11, 10, 0),
    })
    .unwrap();
    let plan = plan_booking(&back_to_back, &existing).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.bookings[0].duration_minutes, 40);
}
