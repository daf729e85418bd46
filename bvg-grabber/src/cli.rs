//! Command-line front end.
//!
//! Turns the arguments into one or two board queries, merges live bus
//! departures into the timetable when asked to, and writes the result as
//! a single JSON document.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use crate::bvg::{BvgClient, BvgConfig, BvgError, Query, QueryApi};
use crate::domain::{InvalidStation, MergeError, QueryResult, Station, Vehicles};

/// Scheduled departures requested when `--limit` is not given.
pub const DEFAULT_LIMIT: u32 = 9;

/// Environment variable overriding the timetable endpoint.
pub const ENV_SCHEDULED_URL: &str = "BVG_SCHEDULED_URL";
/// Environment variable overriding the live endpoint.
pub const ENV_ACTUAL_URL: &str = "BVG_ACTUAL_URL";
/// Environment variable overriding the request timeout.
pub const ENV_TIMEOUT_SECS: &str = "BVG_TIMEOUT_SECS";

#[derive(Debug, Parser)]
#[command(name = "bvg-grabber", version, about = "Fetch upcoming BVG departures as JSON")]
pub struct Args {
    /// Station name as typed on the BVG site
    pub station: String,

    /// Output file, or `-` / `stdout` for standard output
    pub file: String,

    /// Vehicle types to include; BUS adds live bus departures
    #[arg(long = "vehicle", value_enum, num_args = 0.., ignore_case = true)]
    pub vehicles: Vec<VehicleChoice>,

    /// Maximum number of scheduled departures
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Request timeout, overriding BVG_TIMEOUT_SECS
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Vehicle names accepted by `--vehicle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VehicleChoice {
    #[value(name = "S")]
    SBahn,
    #[value(name = "U")]
    UBahn,
    #[value(name = "TRAM")]
    Tram,
    #[value(name = "BUS")]
    Bus,
    #[value(name = "FERRY")]
    Ferry,
    #[value(name = "RB")]
    Regional,
    #[value(name = "IC")]
    Intercity,
}

impl VehicleChoice {
    pub fn flag(self) -> Vehicles {
        match self {
            VehicleChoice::SBahn => Vehicles::S_BAHN,
            VehicleChoice::UBahn => Vehicles::U_BAHN,
            VehicleChoice::Tram => Vehicles::TRAM,
            VehicleChoice::Bus => Vehicles::BUS,
            VehicleChoice::Ferry => Vehicles::FERRY,
            VehicleChoice::Regional => Vehicles::REGIONAL,
            VehicleChoice::Intercity => Vehicles::INTERCITY,
        }
    }
}

/// Which boards to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Live bus departures only
    Actual,
    /// Timetable departures for the given vehicles
    Scheduled(Vehicles),
    /// Timetable departures with live bus departures merged in
    Combined(Vehicles),
}

impl Plan {
    /// Plan for the vehicles named on the command line.
    ///
    /// The timetable is never asked for buses: they come from the live
    /// board, and a timetable query with an empty filter is skipped.
    pub fn from_choices(choices: &[VehicleChoice]) -> Self {
        let requested: Vehicles = choices.iter().map(|c| c.flag()).collect();
        let scheduled = requested.without(Vehicles::BUS);

        if scheduled.is_empty() {
            Plan::Actual
        } else if requested.contains(Vehicles::BUS) {
            Plan::Combined(scheduled)
        } else {
            Plan::Scheduled(scheduled)
        }
    }
}

/// Where the JSON document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn parse(file: &str) -> Self {
        match file {
            "-" | "stdout" => OutputTarget::Stdout,
            path => OutputTarget::File(PathBuf::from(path)),
        }
    }

    /// Write `document` and a trailing newline, truncating any existing file.
    pub fn write(&self, document: &str) -> Result<(), CliError> {
        match self {
            OutputTarget::Stdout => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{document}")
                    .and_then(|()| out.flush())
                    .map_err(|source| CliError::Output {
                        path: PathBuf::from("stdout"),
                        source,
                    })
            }
            OutputTarget::File(path) => {
                std::fs::write(path, format!("{document}\n")).map_err(|source| {
                    CliError::Output {
                        path: path.clone(),
                        source,
                    }
                })
            }
        }
    }
}

/// Errors that end a CLI run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Station(#[from] InvalidStation),

    #[error(transparent)]
    Bvg(#[from] BvgError),

    #[error("cannot merge live departures: {0}")]
    Merge(#[from] MergeError),

    #[error("cannot serialize result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Client config from the environment, with `--timeout` taking precedence.
pub fn config_from_env(args: &Args) -> BvgConfig {
    config_from(|key| std::env::var(key).ok(), args.timeout)
}

fn config_from(lookup: impl Fn(&str) -> Option<String>, timeout: Option<u64>) -> BvgConfig {
    let mut config = BvgConfig::new();

    if let Some(url) = lookup(ENV_SCHEDULED_URL) {
        config = config.with_scheduled_url(url);
    }
    if let Some(url) = lookup(ENV_ACTUAL_URL) {
        config = config.with_actual_url(url);
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        match raw.trim().parse() {
            Ok(secs) => config = config.with_timeout(secs),
            Err(_) => warn!(value = %raw, "ignoring invalid {ENV_TIMEOUT_SECS}"),
        }
    }
    if let Some(secs) = timeout {
        config = config.with_timeout(secs);
    }

    config
}

/// Run the queries for `plan` and combine their results.
///
/// Live departures are only merged into a successful timetable result;
/// an ambiguous or unknown station is reported as the timetable saw it.
pub async fn execute(
    client: &BvgClient,
    station: Station,
    plan: Plan,
    limit: u32,
) -> Result<QueryResult, CliError> {
    let query: Query = match plan {
        Plan::Actual => client.actual(station.clone()).into(),
        Plan::Scheduled(vehicles) | Plan::Combined(vehicles) => client
            .scheduled(station.clone())
            .with_vehicles(vehicles)
            .with_limit(limit)
            .into(),
    };
    let mut result = query.call().await?;

    if let Plan::Combined(_) = plan {
        if result.success() {
            let live = client.actual(station).call().await?;
            result.merge(live)?;
        } else {
            warn!(%station, "station not resolved, skipping live bus departures");
        }
    }

    Ok(result)
}

/// Parse, query and write.
pub async fn run(args: Args, config: BvgConfig) -> Result<(), CliError> {
    let station = Station::parse(&args.station)?;
    let plan = Plan::from_choices(&args.vehicles);
    let target = OutputTarget::parse(&args.file);
    let client = BvgClient::new(config)?;

    info!(%station, ?plan, limit = args.limit, "querying departures");
    let result = execute(&client, station, plan, args.limit).await?;
    info!(success = result.success(), entries = result.len(), "writing result");

    target.write(&result.to_json()?)
}
