//! Timestamp and duration conversions shared by the decoders.
//!
//! Every converter is total: values that cannot be represented render as an
//! empty string rather than failing the record.

use chrono::DateTime;

use crate::constants::{UNIX_SECONDS_DIGITS, UTC_FORMAT, WEBKIT_EPOCH_OFFSET_SECS};

/// Convert a Unix timestamp to `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Stores mix second, millisecond and microsecond precision, so only the
/// leading ten digits are kept (the same truncation the stores' own
/// viewers apply).
pub fn unix_to_utc(stamp: i64) -> String {
    let digits = stamp.to_string();
    let seconds = if stamp > 0 && digits.len() > UNIX_SECONDS_DIGITS {
        digits[..UNIX_SECONDS_DIGITS].parse::<i64>().unwrap_or(stamp)
    } else {
        stamp
    };
    format_seconds(seconds)
}

/// Convert a WebKit timestamp (microseconds since 1601-01-01) to UTC
pub fn webkit_to_utc(micros: i64) -> String {
    format_seconds(micros.div_euclid(1_000_000) - WEBKIT_EPOCH_OFFSET_SECS)
}

fn format_seconds(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.format(UTC_FORMAT).to_string())
        .unwrap_or_default()
}

/// Format a duration in seconds as `H:MM:SS`; hours are not capped at 24
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
