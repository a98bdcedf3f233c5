//! Capture timestamp parsing and local time conversion.

use crate::constants::CAPTURE_TIMESTAMP_FORMAT;
use crate::error::{MplError, Result};
use chrono::{Duration, NaiveDateTime};

/// Parse the capture date and time fields and shift them to local time
///
/// `date` must be `YYYYMMDD` and `time` must be `HHMMSS`. The local time is
/// the UTC instant minus `utc_offset_hours`, with no daylight saving rules.
pub fn parse_local_timestamp(
    date: &str,
    time: &str,
    utc_offset_hours: i64,
) -> Result<NaiveDateTime> {
    let utc = parse_utc_timestamp(date, time)?;
    Ok(utc - Duration::hours(utc_offset_hours))
}

/// Parse the capture date and time fields as a UTC timestamp
pub fn parse_utc_timestamp(date: &str, time: &str) -> Result<NaiveDateTime> {
    let date = clean_field(date);
    let time = clean_field(time);
    let joined = format!("{} {}", date, time);

    check_digits(date, 8, "date", &joined)?;
    check_digits(time, 6, "time", &joined)?;

    NaiveDateTime::parse_from_str(&joined, CAPTURE_TIMESTAMP_FORMAT).map_err(|e| {
        MplError::TimestampParse {
            value: joined.clone(),
            reason: e.to_string(),
        }
    })
}

/// Strip padding that fixed-width text variables carry
fn clean_field(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}

fn check_digits(value: &str, width: usize, label: &str, joined: &str) -> Result<()> {
    if value.len() != width || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MplError::TimestampParse {
            value: joined.to_string(),
            reason: format!("{} must be {} digits, got '{}'", label, width, value),
        });
    }
    Ok(())
}
