//! Calendar date helpers.
//!
//! Completion dates are local calendar days, never UTC days: a chore done at
//! 9pm local time belongs to that evening's date even when UTC has already
//! rolled over.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Today's date in the local timezone.
#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The Sunday that starts the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday();
    date - Duration::days(i64::from(offset))
}
