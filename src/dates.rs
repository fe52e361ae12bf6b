//! Calendar date helpers

use chrono::{Duration, NaiveDate};

/// Resolve the calendar date of a program day. Day 1 falls on the start
/// date itself. `None` when the day lands outside the representable
/// calendar.
pub fn date_from_start(start: NaiveDate, day_number: u32) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::days(i64::from(day_number) - 1))
}
