//! Resolution of heterogeneous date cells into UTC epoch milliseconds.
//!
//! Accepted encodings, tried in order:
//!
//! - numeric cells, read as epoch milliseconds
//! - serialized .NET dates such as `/Date(1588888000000)/` (any text that
//!   mentions `date` contributes its first digit run)
//! - strict ISO-8601 dates and date-times, read as UTC when no offset is given
//! - `DD-MMM-YY HH:mm:ss`
//! - numeric strings, read as epoch milliseconds

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::value::CellValue;

/// Display format for date cells, e.g. `06-May-24 14:30`.
pub const TIME_FORMAT: &str = "%d-%b-%y %H:%M";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%b-%y %H:%M:%S",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%:z"];

pub fn resolve_epoch_millis(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => checked_millis(n.trunc() as i64),
        CellValue::Text(text) => parse_epoch_millis(text),
        _ => None,
    }
}

pub fn parse_epoch_millis(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.to_ascii_lowercase().contains("date") {
        return first_digit_run(trimmed).and_then(checked_millis);
    }
    if let Some(millis) = parse_iso_like(trimmed) {
        return Some(millis);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .and_then(|n| checked_millis(n.trunc() as i64))
}

pub fn to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

pub fn format_millis(millis: i64) -> Option<String> {
    to_datetime(millis).map(|dt| dt.format(TIME_FORMAT).to_string())
}

fn parse_iso_like(value: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.timestamp_millis());
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, fmt) {
            return Some(parsed.timestamp_millis());
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn first_digit_run(value: &str) -> Option<i64> {
    let start = value.find(|c: char| c.is_ascii_digit())?;
    let digits: String = value[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn checked_millis(millis: i64) -> Option<i64> {
    to_datetime(millis).map(|_| millis)
}
