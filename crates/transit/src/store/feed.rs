//! Building a [`MemoryStore`] from a static GTFS feed.

use std::sync::Arc;

use gtfs_structures::{DirectionType, Gtfs};
use tracing::{info, warn};

use crate::identifiers::*;
use crate::models::{DirectionId, ServiceTime, ShapePoint, Stop, StopTime, Trip};
use crate::store::memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
#[error("failed to read GTFS feed at {path}")]
pub struct FeedError {
    pub path: String,
    #[source]
    pub source: gtfs_structures::Error,
}

impl MemoryStore {
    /// Load a GTFS directory or zip archive.
    pub fn load(path: &str) -> Result<Self, FeedError> {
        let gtfs = Gtfs::new(path).map_err(|source| FeedError {
            path: path.to_string(),
            source,
        })?;
        let store = Self::from_gtfs(&gtfs);
        info!(
            path,
            stops = store.stop_count(),
            trips = store.trip_count(),
            shapes = store.shape_count(),
            "loaded GTFS feed"
        );
        Ok(store)
    }

    pub fn from_gtfs(gtfs: &Gtfs) -> Self {
        let mut stops = Vec::with_capacity(gtfs.stops.len());
        for stop in gtfs.stops.values() {
            let (Some(lat), Some(lon)) = (stop.latitude, stop.longitude) else {
                warn!(stop_id = %stop.id, "skipping stop without coordinates");
                continue;
            };
            stops.push(Stop {
                id: StopIdentifier::new(&stop.id),
                name: stop.name.as_deref().unwrap_or_default().into(),
                location: geo::Point::new(lon, lat),
            });
        }
        // HashMap iteration order is random; keep tie-breaks reproducible
        stops.sort_by(|a, b| a.id.cmp(&b.id));

        let mut trips = Vec::with_capacity(gtfs.trips.len());
        let mut stop_times = Vec::new();
        for trip in gtfs.trips.values() {
            let trip_id = TripIdentifier::new(&trip.id);
            for st in &trip.stop_times {
                stop_times.push(StopTime {
                    trip_id: trip_id.clone(),
                    stop_id: StopIdentifier::new(&st.stop.id),
                    arrival: st.arrival_time.map(ServiceTime::from_seconds),
                    departure: st.departure_time.map(ServiceTime::from_seconds),
                    stop_sequence: u32::from(st.stop_sequence),
                });
            }
            trips.push(Trip {
                id: trip_id,
                route_id: RouteIdentifier::new(&trip.route_id),
                service_id: ServiceIdentifier::new(&trip.service_id),
                shape_id: trip.shape_id.as_deref().map(ShapeIdentifier::new),
                headsign: trip.trip_headsign.as_deref().map(Arc::from),
                direction: trip.direction_id.map(|d| match d {
                    DirectionType::Outbound => DirectionId::Outbound,
                    DirectionType::Inbound => DirectionId::Inbound,
                }),
            });
        }

        let shape_points = gtfs
            .shapes
            .iter()
            .flat_map(|(shape_id, points)| {
                let shape_id = ShapeIdentifier::new(shape_id);
                points.iter().map(move |pt| ShapePoint {
                    shape_id: shape_id.clone(),
                    location: geo::Point::new(pt.longitude, pt.latitude),
                    sequence: pt.sequence as u32,
                })
            })
            .collect();

        Self::from_data(stops, trips, stop_times, shape_points)
    }
}
