//! Calendar helpers shared by the ledgers.
//!
//! Usage counters are bucketed by calendar month (`YYYY-MM`), while billing
//! periods are anchored on the subscription start. The two are deliberately
//! not aligned.

use chrono::{DateTime, Duration, Months, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Calendar-month usage bucket for `at`, e.g. `2026-10`.
pub fn period_month(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Adds calendar months, clamping to the last day of shorter months
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(at: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    at.checked_add_months(Months::new(months))
        // 超出 chrono 可表示范围时退化为按 30 天计
        .unwrap_or_else(|| at + Duration::days(30 * i64::from(months)))
}

/// Whole days from `now` until `end`, rounded up and floored at zero.
pub fn days_until(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (end - now).num_seconds();
    if secs <= 0 {
        return 0;
    }
    (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}
