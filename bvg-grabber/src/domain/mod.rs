//! Domain types for BVG departure boards.
//!
//! This module contains the departure model and the values it is built
//! from. All types validate their input at construction time, so code
//! that receives them can trust their invariants.

mod departure;
mod error;
mod flags;
mod result;
mod station;
mod time;

pub use departure::{Departure, DepartureRecord, When};
pub use error::DepartureError;
pub use flags::{FlagsError, Vehicles, encode_flags};
pub use result::{MergeError, QueryResult};
pub use station::{InvalidStation, Station};
pub use time::{
    TimeError, floor_to_minute, format_date, format_full, format_hour, local_from_unix,
    parse_full, parse_hour_on,
};
