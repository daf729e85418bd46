//! Reading BVG board pages.
//!
//! The timetable and live boards look alike but differ in how they
//! report an unknown or ambiguous station, and their tables are laid out
//! independently, so each has its own rule. Both reduce a page to a
//! [`BoardPage`], which is then turned into a [`QueryResult`].

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::domain::{Departure, DepartureError, QueryResult, Station};

use super::error::BvgError;
use super::html::{self, Element};

/// Timetable board columns.
const SCHEDULED_WHEN: usize = 0;
const SCHEDULED_LINE: usize = 1;
const SCHEDULED_DESTINATION: usize = 2;

/// Live board columns.
const ACTUAL_WHEN: usize = 0;
const ACTUAL_LINE: usize = 1;
const ACTUAL_DESTINATION: usize = 2;

/// Name of the live board's station field.
const STATION_FIELD: &str = "input";

/// One table row, as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub when: String,
    pub line: String,
    pub destination: String,
}

/// What a board page says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardPage {
    /// Departure rows in page order
    Rows(Vec<RawRow>),
    /// Station name matched several stations
    Ambiguous(Vec<String>),
    /// Station name matched nothing
    NotFound,
}

impl BoardPage {
    /// Build departures from `station`, observed at `since`.
    pub fn into_result(
        self,
        station: &Station,
        since: NaiveDateTime,
    ) -> Result<QueryResult, DepartureError> {
        match self {
            BoardPage::Rows(rows) => rows
                .into_iter()
                .map(|row| {
                    Departure::new(
                        station.as_str(),
                        row.destination,
                        row.when,
                        row.line,
                        since,
                    )
                })
                .collect::<Result<Vec<_>, _>>()
                .map(QueryResult::Departures),
            BoardPage::Ambiguous(names) => Ok(QueryResult::Ambiguous(names)),
            BoardPage::NotFound => Ok(QueryResult::NotFound),
        }
    }
}

/// Read a timetable page.
///
/// An unknown or ambiguous station is flagged with `<span class="error">`;
/// candidate stations, if any, are the links in `<span class="select">`.
pub fn parse_scheduled(page: &str) -> Result<BoardPage, BvgError> {
    if html::find_with_class(page, "span", "error").is_some() {
        let candidates = html::find_with_class(page, "span", "select")
            .map(|select| texts(&select.children("a")))
            .unwrap_or_default();
        debug!(candidates = candidates.len(), "timetable reports station error");
        return Ok(station_error(candidates));
    }

    let Some(tbody) = html::elements(page, "tbody").into_iter().next() else {
        debug!("timetable page has no table body");
        return Ok(BoardPage::NotFound);
    };

    let mut rows = Vec::new();
    for tr in tbody.children("tr") {
        let cells = tr.children("td");
        if cells.is_empty() {
            continue;
        }
        let [when, line, destination] =
            cell_texts(&cells, [SCHEDULED_WHEN, SCHEDULED_LINE, SCHEDULED_DESTINATION])?;
        trace!(%when, %line, %destination, "timetable row");
        rows.push(RawRow {
            when,
            line,
            destination,
        });
    }

    Ok(BoardPage::Rows(rows))
}

/// Read a live departures page.
///
/// When the station name does not resolve, the live board answers with a
/// station picker: a `<form>` with a `<select name="input">` whose
/// `<option>`s are the candidates. Other selects on the page are ignored.
/// The time cell may carry a trailing real-time marker, which is left in
/// place for the departure parser to ignore.
pub fn parse_actual(page: &str) -> Result<BoardPage, BvgError> {
    let candidates: Vec<String> = html::elements(page, "form")
        .iter()
        .flat_map(|form| form.children("select"))
        .filter(|select| {
            select
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case(STATION_FIELD))
        })
        .flat_map(|select| texts(&select.children("option")))
        .collect();
    if !candidates.is_empty() {
        debug!(candidates = candidates.len(), "live board offers station picker");
        return Ok(BoardPage::Ambiguous(candidates));
    }

    let Some(tbody) = html::elements(page, "tbody").into_iter().next() else {
        debug!("live page has no departures table");
        return Ok(BoardPage::NotFound);
    };

    let mut rows = Vec::new();
    for tr in tbody.children("tr") {
        let cells = tr.children("td");
        if cells.is_empty() {
            continue;
        }
        let [when, line, destination] =
            cell_texts(&cells, [ACTUAL_WHEN, ACTUAL_LINE, ACTUAL_DESTINATION])?;
        trace!(%when, %line, %destination, "live row");
        rows.push(RawRow {
            when,
            line: collapse_whitespace(&line),
            destination,
        });
    }

    Ok(BoardPage::Rows(rows))
}

fn station_error(candidates: Vec<String>) -> BoardPage {
    if candidates.is_empty() {
        BoardPage::NotFound
    } else {
        BoardPage::Ambiguous(candidates)
    }
}

/// Non-empty texts of the given elements.
fn texts(elements: &[Element<'_>]) -> Vec<String> {
    elements
        .iter()
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Texts of the cells at the given positions.
fn cell_texts<const N: usize>(
    cells: &[Element<'_>],
    positions: [usize; N],
) -> Result<[String; N], BvgError> {
    let needed = positions.iter().max().map_or(0, |&p| p + 1);
    if cells.len() < needed {
        return Err(BvgError::Markup(format!(
            "row has {} cells, expected at least {needed}",
            cells.len()
        )));
    }
    Ok(positions.map(|p| cells[p].text()))
}

/// Live line cells wrap the product icon and name over several lines.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvg::testing::*;
    use chrono::NaiveDate;

    fn since() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2013, 1, 2)
            .unwrap()
            .and_hms_opt(16, 4, 30)
            .unwrap()
    }

    #[test]
    fn scheduled_rows() {
        let BoardPage::Rows(rows) = parse_scheduled(SCHEDULED_PAGE).unwrap() else {
            panic!("expected rows");
        };

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            RawRow {
                when: "16:07".into(),
                line: "S5".into(),
                destination: "S Westkreuz".into(),
            }
        );
        assert_eq!(rows[2].line, "S75");
    }

    #[test]
    fn scheduled_ambiguous() {
        assert_eq!(
            parse_scheduled(SCHEDULED_AMBIGUOUS).unwrap(),
            BoardPage::Ambiguous(vec![
                "Berlin Hauptbahnhof".into(),
                "Berlin Zoologischer Garten".into(),
                "Berlin Ostbahnhof".into(),
            ])
        );
    }

    #[test]
    fn scheduled_not_found() {
        assert_eq!(
            parse_scheduled(SCHEDULED_NOT_FOUND).unwrap(),
            BoardPage::NotFound
        );
        assert_eq!(
            parse_scheduled("<span class=\"error\">?</span>").unwrap(),
            BoardPage::NotFound
        );
    }

    #[test]
    fn scheduled_without_table() {
        assert_eq!(
            parse_scheduled("<html><body>Wartung</body></html>").unwrap(),
            BoardPage::NotFound
        );
    }

    #[test]
    fn scheduled_short_row_is_markup_error() {
        let page = "<table><tbody><tr><td>16:07</td><td>S5</td></tr></tbody></table>";
        let err = parse_scheduled(page).unwrap_err();
        assert!(matches!(err, BvgError::Markup(_)));
        assert_eq!(
            err.to_string(),
            "unexpected markup: row has 2 cells, expected at least 3"
        );
    }

    #[test]
    fn scheduled_into_result() {
        let station = Station::parse("Alexanderplatz").unwrap();
        let result = parse_scheduled(SCHEDULED_PAGE)
            .unwrap()
            .into_result(&station, since())
            .unwrap();

        let deps = result.departures().unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].start(), "Alexanderplatz");
        assert_eq!(deps[0].end(), "S Westkreuz");
        assert_eq!(deps[0].line(), "S5");
        assert_eq!(deps[0].remaining(), 180);
        assert_eq!(deps[1].remaining(), 300);
    }

    #[test]
    fn actual_rows() {
        let BoardPage::Rows(rows) = parse_actual(ACTUAL_PAGE).unwrap() else {
            panic!("expected rows");
        };

        assert_eq!(
            rows,
            [
                RawRow {
                    when: "16:05 *".into(),
                    line: "Bus M48".into(),
                    destination: "S+U Alexanderplatz".into(),
                },
                RawRow {
                    when: "16:11".into(),
                    line: "Bus 200".into(),
                    destination: "Michelangelostr.".into(),
                },
            ]
        );
    }

    #[test]
    fn actual_marker_is_ignored() {
        let station = Station::parse("Zoologischer Garten").unwrap();
        let result = parse_actual(ACTUAL_PAGE)
            .unwrap()
            .into_result(&station, since())
            .unwrap();

        let deps = result.departures().unwrap();
        assert_eq!(deps[0].to_record().when_hour, "16:05");
        assert_eq!(deps[0].remaining(), 60);
    }

    #[test]
    fn actual_ambiguous() {
        assert_eq!(
            parse_actual(ACTUAL_AMBIGUOUS).unwrap(),
            BoardPage::Ambiguous(vec![
                "Berlin Hauptbahnhof".into(),
                "Berlin Zoologischer Garten".into(),
            ])
        );
    }

    #[test]
    fn actual_ignores_other_pickers() {
        let page = r#"
<form action="/IstAbfahrtzeiten/index/mobil">
  <select name="count"><option>10</option><option>20</option></select>
</form>
<table><tbody><tr><td>16:11</td><td>Bus 200</td><td>Michelangelostr.</td></tr></tbody></table>"#;

        let BoardPage::Rows(rows) = parse_actual(page).unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, "Bus 200");
    }

    #[test]
    fn actual_not_found() {
        assert_eq!(parse_actual(ACTUAL_NOT_FOUND).unwrap(), BoardPage::NotFound);
    }

    #[test]
    fn bad_time_surfaces_as_departure_error() {
        let page = "<tbody><tr><td>bald</td><td>S5</td><td>Westkreuz</td></tr></tbody>";
        let station = Station::parse("Alexanderplatz").unwrap();
        let err = parse_scheduled(page)
            .unwrap()
            .into_result(&station, since())
            .unwrap_err();
        assert_eq!(err, DepartureError::InvalidFormat("bald".into()));
    }

    #[test]
    fn station_pages_map_to_results() {
        let station = Station::parse("Berlin").unwrap();

        let ambiguous = parse_scheduled(SCHEDULED_AMBIGUOUS)
            .unwrap()
            .into_result(&station, since())
            .unwrap();
        assert!(!ambiguous.success());
        assert_eq!(ambiguous.suggestions().len(), 3);

        let missing = parse_actual(ACTUAL_NOT_FOUND)
            .unwrap()
            .into_result(&station, since())
            .unwrap();
        assert!(!missing.success());
        assert!(missing.is_empty());
    }
}
