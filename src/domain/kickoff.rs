//! Parsing and formatting of match start times.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use thiserror::Error;

/// Naive layouts accepted besides RFC 3339, interpreted in the configured offset.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%d.%m.%Y %H:%M"];

const LABEL_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KickoffParseError {
    #[error("unrecognised start time {0:?}, expected YYYY-MM-DD HH:MM, DD.MM.YYYY HH:MM or RFC 3339")]
    Unrecognised(String),
    #[error("invalid UTC offset {0:?}, expected +HH:MM or -HH:MM")]
    InvalidOffset(String),
}

/// Parse a start time. Inputs without an explicit offset are read in `offset`.
pub fn parse_start_time(
    input: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, KickoffParseError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .ok_or_else(|| KickoffParseError::Unrecognised(input.to_string()))
}

/// Human label used in reminders and listings, e.g. `06.06.2025 20:45`.
pub fn format_start_label(start: &DateTime<FixedOffset>) -> String {
    start.format(LABEL_FORMAT).to_string()
}

/// Parse `+HH:MM` / `-HH:MM` (or `Z`) into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, KickoffParseError> {
    let raw = raw.trim();
    let invalid = || KickoffParseError::InvalidOffset(raw.to_string());

    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
