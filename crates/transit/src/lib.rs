//! # routefinder-transit
//!
//! Single-trip route resolution over static GTFS data.
//!
//! ## Features
//!
//! - **Nearest stops**: Haversine search for the stops closest to the origin and destination
//! - **Trip choice**: Latest trip reaching the destination within a lookback window
//! - **Segments**: The chosen trip's calls and shape geometry between boarding and alighting
//! - **Pluggable storage**: Any async [`store::TransitStore`], with an in-memory one built in
//! - **GTFS loading**: Build the in-memory store from a feed (`feed` feature)
//!
//! ## Example
//!
//! ```
//! use routefinder_transit::prelude::*;
//! use geo::Point;
//!
//! let stops = vec![
//!     Stop::new("A", "Alpha", 0.0, 0.0),
//!     Stop::new("B", "Beta", 0.0, 1.0),
//! ];
//! let trip = Trip {
//!     id: TripIdentifier::new("T1"),
//!     route_id: RouteIdentifier::new("R1"),
//!     service_id: ServiceIdentifier::new("weekday"),
//!     shape_id: Some(ShapeIdentifier::new("S1")),
//!     headsign: None,
//!     direction: None,
//! };
//! let at = |s: &str| s.parse::<ServiceTime>().unwrap();
//! let stop_times = vec![
//!     StopTime::new("T1", "A", at("16:00:00"), at("16:00:00"), 1),
//!     StopTime::new("T1", "B", at("16:20:00"), at("16:20:00"), 2),
//! ];
//! let shape = vec![
//!     ShapePoint::new("S1", 0.0, 0.0, 1),
//!     ShapePoint::new("S1", 0.0, 1.0, 2),
//! ];
//!
//! let planner = RoutePlanner::new(MemoryStore::from_data(stops, vec![trip], stop_times, shape));
//!
//! let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! let route = rt
//!     .block_on(planner.resolve_route(Point::new(0.01, 0.0), Point::new(0.99, 0.0)))
//!     .unwrap();
//! assert_eq!(route.boarding.stop.id.as_str(), "A");
//! assert_eq!(route.alighting.stop.id.as_str(), "B");
//! ```

pub mod identifiers;
pub mod models;
pub mod planner;
pub mod spatial;
pub mod store;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{DirectionId, ServiceTime, ShapePoint, Stop, StopTime, TimeWindow, Trip};
    pub use crate::planner::{
        PlanError, PlannerConfig, RoutePlanner, RouteQuery, RouteResult, SegmentStop,
        ShapeMatchPolicy, Stage, StopMatch,
    };
    pub use crate::spatial::{haversine_km, nearest};
    pub use crate::store::{MemoryStore, StoreError, TimeoutStore, TransitStore};
}

pub use prelude::*;
