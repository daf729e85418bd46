//! A single departure from a station.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use super::error::DepartureError;
use super::time::{
    floor_to_minute, format_full, format_hour, local_from_unix, parse_full, parse_hour_on,
};

/// The departure moment as it arrives from a board, before resolution.
///
/// Boards hand out times in several shapes. A `When` is resolved into a
/// concrete instant exactly once, when the [`Departure`] is built.
#[derive(Debug, Clone, PartialEq)]
pub enum When {
    /// Unix timestamp, interpreted in local time
    Timestamp(i64),
    /// Already resolved local instant
    Instant(NaiveDateTime),
    /// "YYYY-MM-DD HH:MM:SS", or "HH:MM" on the reference date
    Text(String),
}

impl When {
    /// Resolve to a local instant. `since` supplies the date for the
    /// "HH:MM" form.
    fn resolve(self, since: NaiveDateTime) -> Result<NaiveDateTime, DepartureError> {
        match self {
            When::Timestamp(secs) => {
                local_from_unix(secs).map_err(|_| DepartureError::InvalidTimestamp(secs))
            }
            When::Instant(instant) => Ok(instant),
            When::Text(s) => parse_full(&s)
                .or_else(|_| parse_hour_on(&s, since.date()))
                .map_err(|_| DepartureError::InvalidFormat(s)),
        }
    }
}

impl From<i64> for When {
    fn from(secs: i64) -> Self {
        When::Timestamp(secs)
    }
}

impl From<NaiveDateTime> for When {
    fn from(instant: NaiveDateTime) -> Self {
        When::Instant(instant)
    }
}

impl From<&str> for When {
    fn from(s: &str) -> Self {
        When::Text(s.to_string())
    }
}

impl From<String> for When {
    fn from(s: String) -> Self {
        When::Text(s)
    }
}

/// Dynamic input, e.g. a departure time read from a JSON row.
///
/// Numbers are Unix timestamps (fractional seconds are dropped), strings
/// are parsed later. Every other JSON type is rejected.
impl TryFrom<&Value> for When {
    type Error = DepartureError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.floor() as i64))
                .map(When::Timestamp)
                .ok_or(DepartureError::UnsupportedType("number")),
            Value::String(s) => Ok(When::Text(s.clone())),
            Value::Null => Err(DepartureError::UnsupportedType("null")),
            Value::Bool(_) => Err(DepartureError::UnsupportedType("bool")),
            Value::Array(_) => Err(DepartureError::UnsupportedType("array")),
            Value::Object(_) => Err(DepartureError::UnsupportedType("object")),
        }
    }
}

/// A departure of a line from `start` towards `end`.
///
/// Departures are immutable once built. Equality and ordering look at the
/// departure instant only, so sorting a board sorts it by time and two
/// departures at the same instant compare equal whatever their lines.
///
/// # Examples
///
/// ```
/// use bvg_grabber::domain::Departure;
/// use chrono::NaiveDate;
///
/// let now = NaiveDate::from_ymd_opt(2013, 1, 2).unwrap().and_hms_opt(3, 4, 0).unwrap();
/// let dep = Departure::new("Alexanderplatz", "Ruhleben", "03:09", "U2", now).unwrap();
///
/// assert_eq!(dep.remaining(), 300);
/// assert_eq!(
///     dep.to_string(),
///     "Start: Alexanderplatz, End: Ruhleben, when: 03:09, now: 03:04, line: U2"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Departure {
    start: String,
    end: String,
    line: String,
    when: NaiveDateTime,
    since: NaiveDateTime,
}

impl Departure {
    /// Build a departure, resolving `when` against the reference instant
    /// `since`.
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        when: impl Into<When>,
        line: impl Into<String>,
        since: NaiveDateTime,
    ) -> Result<Self, DepartureError> {
        let when = when.into().resolve(since)?;

        Ok(Self {
            start: start.into(),
            end: end.into(),
            line: line.into(),
            when,
            since,
        })
    }

    /// Build a departure relative to the current local time.
    pub fn since_now(
        start: impl Into<String>,
        end: impl Into<String>,
        when: impl Into<When>,
        line: impl Into<String>,
    ) -> Result<Self, DepartureError> {
        Self::new(start, end, when, line, Local::now().naive_local())
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// The departure instant.
    pub fn when(&self) -> NaiveDateTime {
        self.when
    }

    /// The reference instant the departure was observed at.
    pub fn since(&self) -> NaiveDateTime {
        self.since
    }

    /// Seconds until departure, in whole minutes.
    ///
    /// Both instants are truncated to the minute before subtracting, so
    /// the result is always a multiple of 60 and changes in one-minute
    /// steps. Negative values mean the departure is in the past.
    pub fn remaining(&self) -> i64 {
        floor_to_minute(self.when)
            .signed_duration_since(floor_to_minute(self.since))
            .num_seconds()
    }

    /// Flat export used for JSON output.
    pub fn to_record(&self) -> DepartureRecord {
        DepartureRecord {
            start: self.start.clone(),
            end: self.end.clone(),
            line: self.line.clone(),
            now_full: format_full(self.since),
            now_hour: format_hour(self.since),
            when_full: format_full(self.when),
            when_hour: format_hour(self.when),
            remaining: self.remaining(),
        }
    }
}

impl PartialEq for Departure {
    fn eq(&self, other: &Self) -> bool {
        self.when == other.when
    }
}

impl Eq for Departure {}

impl Ord for Departure {
    fn cmp(&self, other: &Self) -> Ordering {
        self.when.cmp(&other.when)
    }
}

impl PartialOrd for Departure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Departure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Start: {}, End: {}, when: {}, now: {}, line: {}",
            self.start,
            self.end,
            format_hour(self.when),
            format_hour(self.since),
            self.line
        )
    }
}

/// Serialized form of a [`Departure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartureRecord {
    pub start: String,
    pub end: String,
    pub line: String,
    /// Reference instant, "YYYY-MM-DD HH:MM:SS"
    pub now_full: String,
    /// Reference instant, "HH:MM"
    pub now_hour: String,
    /// Departure instant, "YYYY-MM-DD HH:MM:SS"
    pub when_full: String,
    /// Departure instant, "HH:MM"
    pub when_hour: String,
    /// Seconds until departure, a multiple of 60
    pub remaining: i64,
}
