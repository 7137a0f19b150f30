use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::TimeDelta;
use clap::Parser;
use geo::Point;
use routefinder_transit::{
    planner::config::{DEFAULT_LOOKBACK_MINUTES, DEFAULT_REFERENCE_TIME},
    MemoryStore, PlannerConfig, RoutePlanner, RouteQuery, ServiceTime, ShapeMatchPolicy,
    TimeoutStore,
};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "route-cli",
    author,
    version,
    about = "Resolve a single transit trip between two coordinates",
    long_about = "Loads a static GTFS feed, finds the trip that most recently reached the \
                  stop nearest the destination, and prints the boarding stop, alighting \
                  stop, intermediate stops and trimmed shape as JSON."
)]
struct Args {
    /// GTFS feed directory or zip archive
    #[arg(short, long)]
    feed: PathBuf,

    /// Origin as LAT,LON
    #[arg(short, long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    origin: Point,

    /// Destination as LAT,LON
    #[arg(short, long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    destination: Point,

    /// Reference service time (HH:MM:SS)
    #[arg(long, default_value_t = DEFAULT_REFERENCE_TIME)]
    at: ServiceTime,

    /// How far before the reference time a trip may arrive
    #[arg(long, default_value_t = DEFAULT_LOOKBACK_MINUTES)]
    lookback_minutes: i64,

    /// Maximum distance between a stop and its nearest shape point, in meters
    #[arg(long, default_value_t = 250.0)]
    tolerance_m: f64,

    /// Per-query store timeout in milliseconds
    #[arg(long, default_value_t = 5_000)]
    timeout_ms: u64,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_coordinate(s: &str) -> Result<Point, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinate out of range: {lat},{lon}"));
    }
    Ok(Point::new(lon, lat))
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    if args.lookback_minutes < 0 {
        bail!("--lookback-minutes must not be negative");
    }
    if args.tolerance_m.is_nan() || args.tolerance_m < 0.0 {
        bail!("--tolerance-m must be a non-negative number");
    }

    let feed = args.feed.to_string_lossy().into_owned();
    let store = tokio::task::spawn_blocking(move || MemoryStore::load(&feed))
        .await
        .context("Feed loader panicked")?
        .with_context(|| format!("Failed to load GTFS feed from {}", args.feed.display()))?;

    let store = Arc::new(TimeoutStore::new(store, Duration::from_millis(args.timeout_ms)));
    let config = PlannerConfig {
        reference_time: args.at,
        lookback: TimeDelta::minutes(args.lookback_minutes),
        shape_match: ShapeMatchPolicy {
            fallback_tolerance_km: args.tolerance_m / 1000.0,
            ..ShapeMatchPolicy::default()
        },
    };
    let planner = RoutePlanner::with_config(store, config);

    let feed = planner.store().inner();
    info!(
        stops = feed.stop_count(),
        trips = feed.trip_count(),
        at = %planner.config().reference_time,
        "planner ready"
    );

    let query = RouteQuery::new(args.origin, args.destination)
        .at(planner.config().reference_time)
        .with_lookback(planner.config().lookback);
    let route = planner
        .resolve(&query)
        .await
        .context("No route could be resolved")?;

    info!(
        trip = %route.trip.id,
        boarding = %route.boarding.stop.id,
        alighting = %route.alighting.stop.id,
        stops = route.stops.len(),
        "resolved route"
    );

    let json = route.to_json().context("Failed to encode route")?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
