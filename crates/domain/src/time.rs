//! Time and timestamp helpers.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};

/// UTC timestamp attached to device updates.
pub type Timestamp = DateTime<Utc>;

/// Length of the repeat period for scheduled device actions.
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse a wall-clock time given as `HH:MM:SS` or `HH:MM`.
///
/// # Errors
///
/// Returns the chrono parse error when neither format matches.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
}

/// Delay from `now` until the next occurrence of `target`.
///
/// Times already past today wrap to tomorrow, so the result is always in
/// `[0, 24h)`.
#[must_use]
pub fn delay_until(target: NaiveTime, now: NaiveTime) -> Duration {
    let day_millis = i64::try_from(DAY.as_millis()).unwrap_or(i64::MAX);
    let millis = target
        .signed_duration_since(now)
        .num_milliseconds()
        .rem_euclid(day_millis);
    Duration::from_millis(u64::try_from(millis).unwrap_or_default())
}
