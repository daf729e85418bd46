//! Board queries.
//!
//! A query knows how to ask one BVG board about one station and how to
//! read the answer. Every query answers to [`QueryApi::call`]; there is
//! no generic board, so the trait has no default body.

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::domain::{QueryResult, Station, Vehicles, format_date, format_hour};

use super::client::BvgClient;
use super::error::BvgError;
use super::page::{parse_actual, parse_scheduled};

/// A departure query against a BVG board.
pub trait QueryApi {
    /// Fetch the board and interpret it.
    ///
    /// Ambiguous or unknown stations come back as unsuccessful
    /// [`QueryResult`]s; only transport, markup and row errors fail.
    fn call(&self) -> impl Future<Output = Result<QueryResult, BvgError>> + Send;
}

/// Timetable departures, filtered by vehicle type.
#[derive(Debug, Clone)]
pub struct ScheduledQuery {
    client: BvgClient,
    station: Station,
    vehicles: Vehicles,
    limit: u32,
}

impl ScheduledQuery {
    /// Query all vehicle types, up to the client's default limit.
    pub fn new(client: BvgClient, station: Station) -> Self {
        let limit = client.config().default_limit;
        Self {
            client,
            station,
            vehicles: Vehicles::ALL,
            limit,
        }
    }

    pub fn with_vehicles(mut self, vehicles: Vehicles) -> Self {
        self.vehicles = vehicles;
        self
    }

    /// Set the maximum number of departures requested.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn vehicles(&self) -> Vehicles {
        self.vehicles
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Request parameters for a query issued at `now`.
    pub fn params(&self, now: NaiveDateTime) -> Result<Vec<(&'static str, Vec<u8>)>, BvgError> {
        Ok(vec![
            ("input", self.station.latin1().to_vec()),
            ("time", format_hour(now).into_bytes()),
            ("date", format_date(now).into_bytes()),
            ("productsFilter", self.vehicles.encode()?.into_bytes()),
            ("maxJourneys", self.limit.to_string().into_bytes()),
            ("start", b"yes".to_vec()),
        ])
    }

    /// Interpret a timetable page fetched at `now`.
    pub fn interpret(&self, page: &str, now: NaiveDateTime) -> Result<QueryResult, BvgError> {
        Ok(parse_scheduled(page)?.into_result(&self.station, now)?)
    }
}

impl QueryApi for ScheduledQuery {
    async fn call(&self) -> Result<QueryResult, BvgError> {
        let now = Local::now().naive_local();
        let params = self.params(now)?;
        let page = self
            .client
            .fetch(&self.client.config().scheduled_url, &params)
            .await?;
        let result = self.interpret(&page, now)?;

        info!(
            station = %self.station,
            vehicles = %self.vehicles,
            success = result.success(),
            entries = result.len(),
            "scheduled departures"
        );
        Ok(result)
    }
}

/// Live bus departures.
#[derive(Debug, Clone)]
pub struct ActualQuery {
    client: BvgClient,
    station: Station,
}

impl ActualQuery {
    /// The live board only covers buses.
    pub const VEHICLES: Vehicles = Vehicles::BUS;

    pub fn new(client: BvgClient, station: Station) -> Self {
        Self { client, station }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    /// Request parameters.
    pub fn params(&self) -> Vec<(&'static str, Vec<u8>)> {
        vec![("input", self.station.latin1().to_vec())]
    }

    /// Interpret a live page fetched at `now`.
    pub fn interpret(&self, page: &str, now: NaiveDateTime) -> Result<QueryResult, BvgError> {
        Ok(parse_actual(page)?.into_result(&self.station, now)?)
    }
}

impl QueryApi for ActualQuery {
    async fn call(&self) -> Result<QueryResult, BvgError> {
        let now = Local::now().naive_local();
        let page = self
            .client
            .fetch(&self.client.config().actual_url, &self.params())
            .await?;
        let result = self.interpret(&page, now)?;

        info!(
            station = %self.station,
            success = result.success(),
            entries = result.len(),
            "live bus departures"
        );
        Ok(result)
    }
}

/// Either kind of query, for callers that pick one at runtime.
#[derive(Debug, Clone)]
pub enum Query {
    Scheduled(ScheduledQuery),
    Actual(ActualQuery),
}

impl QueryApi for Query {
    async fn call(&self) -> Result<QueryResult, BvgError> {
        match self {
            Query::Scheduled(q) => q.call().await,
            Query::Actual(q) => q.call().await,
        }
    }
}

impl From<ScheduledQuery> for Query {
    fn from(q: ScheduledQuery) -> Self {
        Query::Scheduled(q)
    }
}

impl From<ActualQuery> for Query {
    fn from(q: ActualQuery) -> Self {
        Query::Actual(q)
    }
}
