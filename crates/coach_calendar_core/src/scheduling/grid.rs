//! Sunday-first month grid for the calendar view.

use chrono::{Datelike, Days, NaiveDate};

use crate::domain::{CalendarDay, MonthRef};

const DAYS_PER_WEEK: u32 = 7;

/// Builds the grid of whole weeks that shows the month containing `reference`.
///
/// The grid opens with the tail of the previous month (as many days as the
/// weekday index of the 1st, Sunday = 0), then every day of the month, then
/// the head of the next month until the length is a multiple of seven.
///
/// A reference in the first or last representable month yields the grid of
/// the adjacent month, since the padding around the edge months cannot be
/// represented.
pub fn build_month_grid(reference: NaiveDate) -> Vec<CalendarDay> {
    let month = MonthRef::containing(reference);
    let first = month.first_day();

    let leading = first.weekday().num_days_from_sunday();
    let cells = (leading + month.days_in_month()).div_ceil(DAYS_PER_WEEK) * DAYS_PER_WEEK;
    // `MonthRef` only holds months whose padded grid fits in the date range.
    let Some(grid_start) = first.checked_sub_days(Days::new(u64::from(leading))) else {
        return Vec::new();
    };

    grid_start
        .iter_days()
        .take(cells as usize)
        .map(|date| CalendarDay {
            date,
            in_current_month: month.contains(date),
        })
        .collect()
}
