//! Time handling for BVG departure boards.
//!
//! BVG pages show departures as "HH:MM" strings, sometimes followed by a
//! real-time marker. Departures are otherwise exchanged as full
//! "YYYY-MM-DD HH:MM:SS" timestamps. Both forms resolve to a local
//! [`NaiveDateTime`].

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Format used for full timestamps, both for parsing and rendering.
const FULL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for the hour form.
const HOUR_FORMAT: &str = "%H:%M";

/// Format of the `date` parameter expected by the timetable endpoint.
const DATE_FORMAT: &str = "%d.%m.%Y";

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Render an instant as "HH:MM" (24-hour, zero-padded).
///
/// ```
/// use bvg_grabber::domain::format_hour;
/// use chrono::NaiveDate;
///
/// let dt = NaiveDate::from_ymd_opt(2013, 1, 2).unwrap().and_hms_opt(3, 4, 45).unwrap();
/// assert_eq!(format_hour(dt), "03:04");
/// ```
pub fn format_hour(instant: NaiveDateTime) -> String {
    instant.format(HOUR_FORMAT).to_string()
}

/// Render an instant as "YYYY-MM-DD HH:MM:SS".
pub fn format_full(instant: NaiveDateTime) -> String {
    instant.format(FULL_FORMAT).to_string()
}

/// Render the date of an instant as "DD.MM.YYYY".
pub fn format_date(instant: NaiveDateTime) -> String {
    instant.format(DATE_FORMAT).to_string()
}

/// Parse a full "YYYY-MM-DD HH:MM:SS" timestamp.
pub fn parse_full(s: &str) -> Result<NaiveDateTime, TimeError> {
    NaiveDateTime::parse_from_str(s, FULL_FORMAT)
        .map_err(|_| TimeError::new("expected YYYY-MM-DD HH:MM:SS format"))
}

/// Parse an "HH:MM" time on the given date.
///
/// Anything after the first five characters is ignored as long as it
/// contains no digits, so live boards that append a marker (`"16:15 *"`)
/// still parse.
///
/// # Examples
///
/// ```
/// use bvg_grabber::domain::parse_hour_on;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2013, 1, 2).unwrap();
///
/// assert!(parse_hour_on("16:15", date).is_ok());
/// assert!(parse_hour_on("16:15\n \t*", date).is_ok());
///
/// assert!(parse_hour_on("1615", date).is_err());
/// assert!(parse_hour_on("16:155", date).is_err());
/// assert!(parse_hour_on("24:00", date).is_err());
/// ```
pub fn parse_hour_on(s: &str, date: NaiveDate) -> Result<NaiveDateTime, TimeError> {
    let bytes = s.as_bytes();

    if bytes.len() < 5 {
        return Err(TimeError::new("expected HH:MM format"));
    }

    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    // The first five bytes are ASCII, so index 5 is a char boundary.
    if s[5..].chars().any(|c| c.is_ascii_digit()) {
        return Err(TimeError::new("unexpected digits after HH:MM"));
    }

    let time =
        NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))?;

    Ok(date.and_time(time))
}

/// Drop the seconds and sub-second part of an instant.
pub fn floor_to_minute(instant: NaiveDateTime) -> NaiveDateTime {
    let minutes = i64::from(instant.hour() * 60 + instant.minute());
    instant.date().and_time(NaiveTime::MIN) + Duration::minutes(minutes)
}

/// Interpret a Unix timestamp in the local time zone.
pub fn local_from_unix(secs: i64) -> Result<NaiveDateTime, TimeError> {
    DateTime::from_timestamp(secs, 0)
        .map(|utc| utc.with_timezone(&Local).naive_local())
        .ok_or_else(|| TimeError::new("timestamp out of range"))
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
