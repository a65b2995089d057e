//! Flexible timestamp handling for Jira exports.
//!
//! Jira writes different timestamp shapes depending on where the data came
//! from: the REST API emits RFC 3339 with a numeric offset
//! (`2025-12-01T09:30:00.000+0000`), while CSV exports from the issue
//! navigator use the locale-ish `01/Dec/25 9:30 AM`. Spreadsheet uploads
//! want neither — they want a plain naive timestamp. This module parses
//! whatever shows up and renders `YYYY-MM-DD HH:MM:SS`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats tried in order against a value with a UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Formats tried in order against a naive value.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%b/%y %I:%M %p",
    "%d/%b/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%y %H:%M",
];

/// How parsed timestamps are rendered in report cells.
const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a timestamp in any of the known Jira shapes.
///
/// Offset-carrying values keep their wall-clock time and lose the offset
/// (the spreadsheet upload treats times as site-local). Returns `None`
/// when nothing matches.
pub fn parse_flexible(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.naive_local());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    // Date-only values get a midnight time component.
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

/// Coerce a cell to a normalised timestamp string, or empty when it does
/// not parse. Mirrors the permissive coerce-on-error loading the upload
/// templates were built around: a bad date must never abort the run.
pub fn coerce(value: &str) -> String {
    match parse_flexible(value) {
        Some(dt) => dt.format(OUTPUT_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Strip the timezone offset from an API timestamp for spreadsheet
/// compatibility, keeping the wall-clock time. Values that do not parse
/// pass through verbatim so no exported data is lost.
pub fn strip_timezone(value: &str) -> String {
    match parse_flexible(value) {
        Some(dt) => dt.format(OUTPUT_FORMAT).to_string(),
        None => value.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_api_timestamp_with_offset() {
        let dt = parse_flexible("2025-12-01T09:30:00.000+0000").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-12-01 09:30:00");
    }

    #[test]
    fn parses_rfc3339_with_colon_offset() {
        let dt = parse_flexible("2025-12-01T09:30:00+05:30").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "09:30");
    }

    #[test]
    fn parses_issue_navigator_export() {
        let dt = parse_flexible("01/Dec/25 9:30 AM").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2025-12-01 09:30");

        let pm = parse_flexible("15/Jan/2026 11:05 PM").unwrap();
        assert_eq!(pm.format("%Y-%m-%d %H:%M").to_string(), "2026-01-15 23:05");
    }

    #[test]
    fn parses_date_only_as_midnight() {
        let dt = parse_flexible("2025-12-01").unwrap();
        assert_eq!(dt.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn coerce_bad_value_to_empty() {
        assert_eq!(coerce("not a date"), "");
        assert_eq!(coerce(""), "");
        assert_eq!(coerce("2025-12-01 10:00:00"), "2025-12-01 10:00:00");
    }

    #[test]
    fn strip_timezone_keeps_wall_clock() {
        assert_eq!(
            strip_timezone("2025-12-01T23:59:59.000+1100"),
            "2025-12-01 23:59:59"
        );
    }

    #[test]
    fn strip_timezone_passes_unknown_through() {
        assert_eq!(strip_timezone("sometime later"), "sometime later");
    }
}
