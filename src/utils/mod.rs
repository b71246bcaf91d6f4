//! Calendar helpers shared by validation and statistics.

use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Calendar year of `now` in UTC.
pub fn current_year(now: DateTime<Utc>) -> i32 {
    now.year()
}

/// Midnight UTC on the first day of `now`'s month.
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}
