//! The assembled answer to a route request and its map rendering.

use chrono::TimeDelta;
use geo::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use crate::models::{ServiceTime, Stop, Trip};
use crate::planner::segment::CandidateStop;

/// A resolved stop and how far it is from the requested coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct StopMatch {
    pub stop: Stop,
    pub distance_km: f64,
}

/// One call of the chosen trip inside the ridden segment.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentStop {
    pub stop: Stop,
    pub arrival: Option<ServiceTime>,
    pub departure: Option<ServiceTime>,
    pub stop_sequence: u32,
}

impl From<CandidateStop> for SegmentStop {
    fn from(c: CandidateStop) -> Self {
        Self {
            stop: c.stop,
            arrival: c.stop_time.arrival,
            departure: c.stop_time.departure,
            stop_sequence: c.stop_time.stop_sequence,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteResult {
    pub origin: Point,
    pub destination: Point,
    pub boarding: StopMatch,
    pub alighting: StopMatch,
    pub trip: Trip,
    /// Shape geometry from the boarding stop to the alighting stop
    pub path: LineString,
    /// Calls from boarding to alighting, both included
    pub stops: Vec<SegmentStop>,
    /// Scheduled time on board, if the feed has both times
    pub duration: Option<TimeDelta>,
}

impl RouteResult {
    /// The ridden path as a single LineString feature.
    pub fn path_geojson(&self) -> FeatureCollection {
        let mut properties = JsonObject::new();
        properties.insert(
            "shape_id".to_string(),
            json!(self.trip.shape_id.as_ref().map(|id| id.to_string())),
        );
        properties.insert("trip_id".to_string(), json!(self.trip.id.to_string()));

        let coords = self.path.coords().map(|c| vec![c.x, c.y]).collect();
        collection(vec![feature(Value::LineString(coords), properties)])
    }

    /// Every call of the segment as a Point feature.
    pub fn stops_geojson(&self) -> FeatureCollection {
        let features = self
            .stops
            .iter()
            .map(|s| {
                let mut properties = JsonObject::new();
                properties.insert("stop_id".to_string(), json!(s.stop.id.to_string()));
                properties.insert("stop_name".to_string(), json!(&*s.stop.name));
                feature(Value::Point(vec![s.stop.lon(), s.stop.lat()]), properties)
            })
            .collect();
        collection(features)
    }

    /// Response payload: echoed request, matched stops and both layers.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        Ok(json!({
            "origin": [self.origin.x(), self.origin.y()],
            "destination": [self.destination.x(), self.destination.y()],
            "start_stop": stop_match_json(&self.boarding),
            "end_stop": stop_match_json(&self.alighting),
            "distance": self.alighting.distance_km,
            "duration_seconds": self.duration.map(|d| d.num_seconds()),
            "trip": {
                "trip_id": self.trip.id.to_string(),
                "route_id": self.trip.route_id.to_string(),
                "service_id": self.trip.service_id.to_string(),
                "headsign": self.trip.headsign.as_deref(),
                "direction_id": self.trip.direction.map(|d| d as u8),
            },
            "shapes_geojson": serde_json::to_value(self.path_geojson())?,
            "stops_geojson": serde_json::to_value(self.stops_geojson())?,
        }))
    }
}

fn stop_match_json(m: &StopMatch) -> serde_json::Value {
    json!({
        "stop_id": m.stop.id.to_string(),
        "stop_name": &*m.stop.name,
        "stop_lat": m.stop.lat(),
        "stop_lon": m.stop.lon(),
        "distance": m.distance_km,
    })
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
