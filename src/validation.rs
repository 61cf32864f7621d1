use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

/// Failures detected before any request leaves the application
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("DNI must have 8 digits.")]
    DniLength,
    #[error("DNI must contain only digits.")]
    DniNotNumeric,
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("Please select a valid date and time.")]
    InvalidDateTime,
}

/// Return the trimmed value, or `MissingField` when it is blank.
pub fn required<'a>(label: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(label))
    } else {
        Ok(trimmed)
    }
}

/// Parse a wall-clock time typed as `HH:MM`.
pub fn parse_time(input: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").map_err(|_| ValidationError::InvalidDateTime)
}

/// Combine a calendar date and a wall-clock time read in `tz` into an instant.
///
/// Local times skipped or repeated by a DST transition are rejected.
pub fn combine_date_time<Tz: TimeZone>(
    date: NaiveDate,
    time: NaiveTime,
    tz: &Tz,
) -> Result<DateTime<Utc>, ValidationError> {
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(ValidationError::InvalidDateTime)
}

/// Render an instant the way the API expects it, e.g. `2025-03-04T14:30:00.000Z`.
pub fn to_iso_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
