//! ISO-8601 instant parsing shared by every upstream timestamp

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::{PressureError, Result};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 instant. Offsets are normalised to UTC; a missing
/// offset is read as UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PressureError::malformed("empty timestamp"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| PressureError::malformed(format!("unparsable timestamp '{raw}'")))
}

/// Parse a NOAA `validTime`, which is an instant optionally followed by
/// `/` and an ISO-8601 duration. Only the leading instant is used.
pub fn parse_valid_time(raw: &str) -> Result<DateTime<Utc>> {
    let instant = raw.split_once('/').map_or(raw, |(instant, _)| instant);
    parse_instant(instant)
}

/// Format an instant the way the observations endpoint expects (`Z`, whole seconds)
#[must_use]
pub fn format_query_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
