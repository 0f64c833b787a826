//! Time handling for temporal axes.
//!
//! Temporal bounds travel as ISO-8601 strings with a nanosecond fraction;
//! the resolution is a plain number expressed in the unit named by the
//! axis `uomLabel`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Format used when writing temporal bounds.
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

/// Unit of a temporal axis resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Resolve a `uomLabel` to a time unit.
    ///
    /// Accepts short and long names as well as CF-style labels such as
    /// `"days since 1970-01-01"`. Returns `None` for non-temporal units.
    pub fn from_uom(label: &str) -> Option<Self> {
        let word = label.split_whitespace().next()?.to_ascii_lowercase();
        match word.as_str() {
            "ns" | "nanosecond" | "nanoseconds" => Some(TimeUnit::Nanoseconds),
            "us" | "µs" | "microsecond" | "microseconds" => Some(TimeUnit::Microseconds),
            "ms" | "millisecond" | "milliseconds" => Some(TimeUnit::Milliseconds),
            "s" | "sec" | "second" | "seconds" => Some(TimeUnit::Seconds),
            "min" | "minute" | "minutes" => Some(TimeUnit::Minutes),
            "h" | "hr" | "hour" | "hours" => Some(TimeUnit::Hours),
            "d" | "day" | "days" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    /// Length of one unit in nanoseconds.
    pub fn nanos(&self) -> i64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Hours => 3_600 * 1_000_000_000,
            TimeUnit::Days => 86_400 * 1_000_000_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid ISO-8601 instant: {0}")]
    InvalidFormat(String),
}

/// Parse an ISO-8601 instant.
///
/// Instants without an offset are taken as UTC; a bare date means midnight.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // numpy-style, no offset, optional fraction
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// Format an instant the way temporal bounds are written.
pub fn format_instant(dt: &DateTime<Utc>) -> String {
    dt.format(INSTANT_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_nanosecond_fraction() {
        let dt = parse_instant("2017-01-16T10:09:21.834255872").unwrap();
        assert_eq!(dt.year(), 2017);
        assert_eq!(dt.day(), 16);
        assert_eq!(dt.nanosecond(), 834_255_872);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_instant("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_instant("2024-01-15").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.day(), 15);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_instant("yesterday").is_err());
        assert!(parse_instant("").is_err());
    }

    #[test]
    fn test_format_keeps_nanoseconds() {
        let dt = parse_instant("2017-01-16T10:09:21.834255872Z").unwrap();
        assert_eq!(format_instant(&dt), "2017-01-16T10:09:21.834255872");
        assert_eq!(parse_instant(&format_instant(&dt)).unwrap(), dt);
    }

    #[test]
    fn test_time_unit_from_uom() {
        assert_eq!(TimeUnit::from_uom("ns"), Some(TimeUnit::Nanoseconds));
        assert_eq!(TimeUnit::from_uom("Days"), Some(TimeUnit::Days));
        assert_eq!(
            TimeUnit::from_uom("seconds since 1970-01-01"),
            Some(TimeUnit::Seconds)
        );
        assert_eq!(TimeUnit::from_uom("degree"), None);
        assert_eq!(TimeUnit::from_uom(""), None);
    }

    #[test]
    fn test_time_unit_nanos() {
        assert_eq!(TimeUnit::Days.nanos(), 86_400_000_000_000);
        assert_eq!(TimeUnit::Milliseconds.nanos(), 1_000_000);
    }
}
