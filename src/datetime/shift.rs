//! Instant arithmetic for values read from page attributes and the settings
//! file. Any integer can show up there, so shifts saturate at chrono's range
//! instead of overflowing.

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};

fn saturated(toward_past: bool) -> DateTime<Utc> {
    if toward_past {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    }
}

/// `at` moved by signed `minutes`, clamped to the representable range
pub fn shift_minutes(at: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    Duration::try_minutes(minutes)
        .and_then(|d| at.checked_add_signed(d))
        .unwrap_or_else(|| saturated(minutes < 0))
}

/// `at` moved by signed `seconds`, clamped to the representable range
pub fn shift_seconds(at: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    Duration::try_seconds(seconds)
        .and_then(|d| at.checked_add_signed(d))
        .unwrap_or_else(|| saturated(seconds < 0))
}

/// Seconds from settings as a `Duration`; unrepresentable values use `fallback`
pub fn seconds_or(seconds: i64, fallback: i64) -> Duration {
    Duration::try_seconds(seconds).unwrap_or_else(|| Duration::seconds(fallback))
}

/// Minutes from settings as a `Duration`; unrepresentable values use `fallback`
pub fn minutes_or(minutes: i64, fallback: i64) -> Duration {
    Duration::try_minutes(minutes).unwrap_or_else(|| Duration::minutes(fallback))
}

/// Offset east of UTC in minutes; anything that is not a valid offset is UTC
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or(Utc.fix())
}
