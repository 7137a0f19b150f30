//! In-memory store over a fully loaded feed.
//!
//! All data is indexed once at construction; queries are plain map lookups
//! followed by filtering.

use std::collections::{HashMap, HashSet};
use std::future::ready;
use std::sync::Arc;

use crate::identifiers::*;
use crate::models::{ShapePoint, Stop, StopTime, TimeWindow, Trip};
use crate::store::traits::{StoreError, StoreFuture, TransitStore};

/// In-memory transit store
///
/// This type is cheap to clone since all data sits behind one `Arc`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Arc<Indexed>,
}

#[derive(Debug, Default)]
struct Indexed {
    stops: Vec<Stop>,
    trips: HashMap<TripIdentifier, Trip>,
    stop_times_by_trip: HashMap<TripIdentifier, Vec<StopTime>>,
    stop_times_by_stop: HashMap<StopIdentifier, Vec<StopTime>>,
    shapes: HashMap<ShapeIdentifier, Vec<ShapePoint>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from raw rows
    pub fn from_data(
        stops: Vec<Stop>,
        trips: Vec<Trip>,
        stop_times: Vec<StopTime>,
        shape_points: Vec<ShapePoint>,
    ) -> Self {
        let trips: HashMap<_, _> = trips.into_iter().map(|t| (t.id.clone(), t)).collect();

        let mut stop_times_by_trip: HashMap<TripIdentifier, Vec<StopTime>> = HashMap::new();
        let mut stop_times_by_stop: HashMap<StopIdentifier, Vec<StopTime>> = HashMap::new();
        for st in stop_times {
            stop_times_by_stop
                .entry(st.stop_id.clone())
                .or_default()
                .push(st.clone());
            stop_times_by_trip.entry(st.trip_id.clone()).or_default().push(st);
        }

        let mut shapes: HashMap<ShapeIdentifier, Vec<ShapePoint>> = HashMap::new();
        for pt in shape_points {
            shapes.entry(pt.shape_id.clone()).or_default().push(pt);
        }

        Self {
            data: Arc::new(Indexed {
                stops,
                trips,
                stop_times_by_trip,
                stop_times_by_stop,
                shapes,
            }),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.data.stops.len()
    }

    pub fn trip_count(&self) -> usize {
        self.data.trips.len()
    }

    pub fn shape_count(&self) -> usize {
        self.data.shapes.len()
    }
}

impl TransitStore for MemoryStore {
    fn all_stops<'a>(&'a self) -> StoreFuture<'a, Vec<Stop>> {
        Box::pin(ready(Ok::<_, StoreError>(self.data.stops.clone())))
    }

    fn arrivals_at_stop<'a>(
        &'a self,
        stop_id: &'a StopIdentifier,
        window: TimeWindow,
    ) -> StoreFuture<'a, Vec<StopTime>> {
        let matches: Vec<StopTime> = self
            .data
            .stop_times_by_stop
            .get(stop_id)
            .map(|list| {
                list.iter()
                    .filter(|st| st.arrival.is_some_and(|t| window.contains(t)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Box::pin(ready(Ok::<_, StoreError>(matches)))
    }

    fn stop_times_for_trips<'a>(
        &'a self,
        trip_ids: &'a [TripIdentifier],
    ) -> StoreFuture<'a, Vec<StopTime>> {
        let mut seen = HashSet::new();
        let matches: Vec<StopTime> = trip_ids
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.data.stop_times_by_trip.get(id))
            .flat_map(|list| list.iter().cloned())
            .collect();
        Box::pin(ready(Ok::<_, StoreError>(matches)))
    }

    fn trip<'a>(&'a self, trip_id: &'a TripIdentifier) -> StoreFuture<'a, Option<Trip>> {
        Box::pin(ready(Ok::<_, StoreError>(self.data.trips.get(trip_id).cloned())))
    }

    fn shape_points<'a>(&'a self, shape_id: &'a ShapeIdentifier) -> StoreFuture<'a, Vec<ShapePoint>> {
        let points = self.data.shapes.get(shape_id).cloned().unwrap_or_default();
        Box::pin(ready(Ok::<_, StoreError>(points)))
    }
}
