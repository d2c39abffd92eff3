use chrono::{DateTime, NaiveDate, Utc};

/// This is the standard way of converting a date to a string in gratitude. Used for storage keys
/// and for anything shown as a bare day.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Distance between two days in whole calendar days, regardless of direction.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> u32 {
    let diff = (a - b).num_days().unsigned_abs();
    u32::try_from(diff).unwrap_or(u32::MAX)
}

/// Distance between the UTC calendar days of two instants. Both instants are truncated to UTC
/// midnight first, so 02:00 and 23:00 of the previous day are 1 day apart while 00:30 and 23:30 of
/// the same day are 0 days apart.
pub fn utc_days_diff(a: DateTime<Utc>, b: DateTime<Utc>) -> u32 {
    days_between(a.date_naive(), b.date_naive())
}
