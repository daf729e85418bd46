//! Outcome of a departure query.

use serde::{Serialize, Serializer};

use super::departure::{Departure, DepartureRecord};

/// Error returned when merging results that carry no departures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("cannot merge into an unsuccessful result")]
    ReceiverUnsuccessful,

    #[error("cannot merge an unsuccessful result")]
    OtherUnsuccessful,
}

/// What a board query produced.
///
/// Only [`QueryResult::Departures`] counts as success. An ambiguous
/// station name is not an error: the board answers with a list of
/// candidate names instead.
#[derive(Debug, Clone)]
pub enum QueryResult {
    /// The station was found; departures in board order
    Departures(Vec<Departure>),
    /// The station name matched several stations
    Ambiguous(Vec<String>),
    /// The station name matched nothing
    NotFound,
}

impl QueryResult {
    pub fn success(&self) -> bool {
        matches!(self, QueryResult::Departures(_))
    }

    /// Departures, if the query succeeded.
    pub fn departures(&self) -> Option<&[Departure]> {
        match self {
            QueryResult::Departures(deps) => Some(deps),
            _ => None,
        }
    }

    /// Candidate station names. Empty unless the name was ambiguous.
    pub fn suggestions(&self) -> &[String] {
        match self {
            QueryResult::Ambiguous(names) => names,
            _ => &[],
        }
    }

    /// Number of entries in the payload.
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Departures(deps) => deps.len(),
            QueryResult::Ambiguous(names) => names.len(),
            QueryResult::NotFound => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the departures of `other` and sort everything by time.
    ///
    /// Both results must be successful. On error `self` is left
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use bvg_grabber::domain::{Departure, QueryResult};
    /// use chrono::NaiveDate;
    ///
    /// let now = NaiveDate::from_ymd_opt(2013, 1, 2).unwrap().and_hms_opt(3, 4, 0).unwrap();
    /// let dep = |when: &str| Departure::new("Zoo", "Spandau", when, "M45", now).unwrap();
    ///
    /// let mut scheduled = QueryResult::Departures(vec![dep("03:10"), dep("03:20")]);
    /// let actual = QueryResult::Departures(vec![dep("03:15")]);
    ///
    /// scheduled.merge(actual).unwrap();
    /// let hours: Vec<_> = scheduled
    ///     .departures()
    ///     .unwrap()
    ///     .iter()
    ///     .map(|d| d.to_record().when_hour)
    ///     .collect();
    /// assert_eq!(hours, ["03:10", "03:15", "03:20"]);
    ///
    /// assert!(scheduled.merge(QueryResult::NotFound).is_err());
    /// ```
    pub fn merge(&mut self, other: QueryResult) -> Result<&mut Self, MergeError> {
        let QueryResult::Departures(ours) = &mut *self else {
            return Err(MergeError::ReceiverUnsuccessful);
        };
        let QueryResult::Departures(theirs) = other else {
            return Err(MergeError::OtherUnsuccessful);
        };

        ours.extend(theirs);
        ours.sort();
        Ok(self)
    }

    /// Render as the compact JSON document written by the CLI.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn to_dto(&self) -> ResultDto<'_> {
        let payload = match self {
            QueryResult::Departures(deps) => {
                Payload::Departures(deps.iter().map(Departure::to_record).collect())
            }
            QueryResult::Ambiguous(names) => Payload::Stations(names),
            QueryResult::NotFound => Payload::Stations(&[]),
        };

        ResultDto {
            success: self.success(),
            payload,
        }
    }
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_dto().serialize(serializer)
    }
}

/// Wire shape: `{"success": bool, "payload": [...]}`.
#[derive(Serialize)]
struct ResultDto<'a> {
    success: bool,
    payload: Payload<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Payload<'a> {
    Departures(Vec<DepartureRecord>),
    Stations(&'a [String]),
}
