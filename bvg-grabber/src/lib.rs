//! Upcoming departures from BVG stations.
//!
//! Queries the Berlin transport company's mobile timetable and live bus
//! boards for a station and turns them into departures with the time
//! remaining until each one leaves.

pub mod bvg;
pub mod cli;
pub mod domain;
