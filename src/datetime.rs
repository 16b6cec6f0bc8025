use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    input: String,
}

impl DateParseError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid date '{}' (expected YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS] or RFC 3339)",
            self.input
        )
    }
}

impl std::error::Error for DateParseError {}

/// Parse a date-only value (`YYYY-MM-DD`).
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| DateParseError::new(input))
}

/// Resolve any accepted event date-time spelling into local wall time.
///
/// Plain dates resolve to midnight. RFC 3339 values keep their wall-clock
/// time and drop the offset, since every event is stored in school-local time.
pub fn parse_event_datetime(input: &str) -> Result<NaiveDateTime, DateParseError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    for format in DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(value);
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|value| value.naive_local())
        .map_err(|_| DateParseError::new(input))
}

/// `dd/mm/yyyy`, the format holidays and recurrence labels are compared and shown in.
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    // 23:59:59 is always representable
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}
