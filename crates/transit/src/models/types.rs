//! Core data types for GTFS reference data.
//!
//! These mirror the four collections the planner reads: stops, stop times,
//! trips and shapes. All of them are immutable once loaded.

use geo::Point;
use std::sync::Arc;

use crate::identifiers::*;
use crate::models::time::ServiceTime;

// ============================================================================
// Enums
// ============================================================================

/// Trip direction (0 = outbound, 1 = inbound per GTFS)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DirectionId {
    Outbound = 0,
    Inbound = 1,
}

impl DirectionId {
    pub fn from_gtfs(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Outbound),
            1 => Some(Self::Inbound),
            _ => None,
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A physical boarding location.
///
/// `location` follows the `geo` convention: x is longitude, y is latitude.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopIdentifier,
    pub name: Arc<str>,
    pub location: Point,
}

impl Stop {
    pub fn new(id: impl Into<StopIdentifier>, name: &str, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: Point::new(lon, lat),
        }
    }

    pub fn lat(&self) -> f64 {
        self.location.y()
    }

    pub fn lon(&self) -> f64 {
        self.location.x()
    }
}

/// The scheduled visit of one trip to one stop.
///
/// GTFS only requires times on timepoints, so either may be missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopTime {
    pub trip_id: TripIdentifier,
    pub stop_id: StopIdentifier,
    pub arrival: Option<ServiceTime>,
    pub departure: Option<ServiceTime>,
    pub stop_sequence: u32,
}

impl StopTime {
    pub fn new(
        trip_id: impl Into<TripIdentifier>,
        stop_id: impl Into<StopIdentifier>,
        arrival: ServiceTime,
        departure: ServiceTime,
        stop_sequence: u32,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            stop_id: stop_id.into(),
            arrival: Some(arrival),
            departure: Some(departure),
            stop_sequence,
        }
    }
}

/// One scheduled vehicle journey.
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    pub id: TripIdentifier,
    pub route_id: RouteIdentifier,
    pub service_id: ServiceIdentifier,
    pub shape_id: Option<ShapeIdentifier>,
    pub headsign: Option<Arc<str>>,
    pub direction: Option<DirectionId>,
}

/// One vertex of a shape polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapePoint {
    pub shape_id: ShapeIdentifier,
    pub location: Point,
    pub sequence: u32,
}

impl ShapePoint {
    pub fn new(shape_id: impl Into<ShapeIdentifier>, lat: f64, lon: f64, sequence: u32) -> Self {
        Self {
            shape_id: shape_id.into(),
            location: Point::new(lon, lat),
            sequence,
        }
    }
}
