use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

pub const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;
pub const DAY_MS: f64 = 24.0 * HOUR_MS;

/// Midnight UTC at the start of a calendar date.
pub fn date_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Signed hours from `start` to `end`.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / HOUR_MS
}

/// Offset an instant by fractional hours, truncated to whole milliseconds.
pub fn add_hours(instant: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    if !hours.is_finite() {
        return instant;
    }
    let millis = (hours * HOUR_MS) as i64;
    Duration::try_milliseconds(millis)
        .and_then(|offset| instant.checked_add_signed(offset))
        .unwrap_or(instant)
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Round half towards positive infinity, so `-2.5` becomes `-2` and `2.5` becomes `3`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to a fixed number of decimals using [`round_half_up`].
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round_half_up(value * factor) / factor
}

/// Format hours for display, one decimal.
pub fn format_hours(hours: f64) -> String {
    format!("{} h", round_to(hours, 1))
}
