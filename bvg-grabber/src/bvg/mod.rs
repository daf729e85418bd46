//! BVG mobile site client.
//!
//! Fetches the timetable and live departure boards and reads them into
//! domain results. Stations are sent as ISO-8859-1, as the site expects.

mod client;
mod error;
mod html;
mod page;
mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{BvgClient, BvgConfig};
pub use error::BvgError;
pub use page::{BoardPage, RawRow, parse_actual, parse_scheduled};
pub use query::{ActualQuery, Query, QueryApi, ScheduledQuery};
