//! Month arithmetic for the dashboard and trend windows. All instants are UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

/// Number of months in the expense trend
pub const TREND_MONTHS: usize = 6;

/// Step used to walk back from the current month when picking trend months
const TREND_STEP_DAYS: i64 = 30;

/// First day of the month containing `date`
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// First day of the month before the one starting at `month_start`
pub fn previous_month_start(month_start: NaiveDate) -> NaiveDate {
    first_of_month(month_start - Duration::days(1))
}

/// First day of the month after the one containing `date`
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    // 32 days past the 1st always lands in the following month
    first_of_month(first_of_month(date) + Duration::days(32))
}

/// Midnight UTC at the start of `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// First day of each trend month, newest first.
///
/// Months are picked by stepping back 30 days at a time from the first of the
/// current month and snapping to the first of whatever month that lands in, so
/// short months can be skipped and long runs can repeat a month.
pub fn trend_month_starts(today: NaiveDate) -> Vec<NaiveDate> {
    let anchor = first_of_month(today);
    (0..TREND_MONTHS as i64)
        .map(|i| first_of_month(anchor - Duration::days(i * TREND_STEP_DAYS)))
        .collect()
}
