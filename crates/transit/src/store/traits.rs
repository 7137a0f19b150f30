//! Pluggable data store trait.
//!
//! The planner only ever reads. Implementations may be in-memory, database
//! backed or remote; every method is a suspension point and dropping the
//! returned future abandons the query.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::identifiers::*;
use crate::models::{ShapePoint, Stop, StopTime, TimeWindow, Trip};

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query timed out after {0:?}")]
    TimedOut(Duration),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Query surface over the four GTFS collections.
///
/// Results come back in no particular order; callers sort.
pub trait TransitStore: Send + Sync {
    /// Every stop in the feed
    fn all_stops<'a>(&'a self) -> StoreFuture<'a, Vec<Stop>>;

    /// Stop times at `stop_id` whose arrival falls inside `window`
    fn arrivals_at_stop<'a>(
        &'a self,
        stop_id: &'a StopIdentifier,
        window: TimeWindow,
    ) -> StoreFuture<'a, Vec<StopTime>>;

    /// Every stop time belonging to one of `trip_ids`
    fn stop_times_for_trips<'a>(
        &'a self,
        trip_ids: &'a [TripIdentifier],
    ) -> StoreFuture<'a, Vec<StopTime>>;

    fn trip<'a>(&'a self, trip_id: &'a TripIdentifier) -> StoreFuture<'a, Option<Trip>>;

    /// Points of one shape; empty if the shape is unknown
    fn shape_points<'a>(&'a self, shape_id: &'a ShapeIdentifier) -> StoreFuture<'a, Vec<ShapePoint>>;
}

impl<T: TransitStore + ?Sized> TransitStore for Arc<T> {
    fn all_stops<'a>(&'a self) -> StoreFuture<'a, Vec<Stop>> {
        (**self).all_stops()
    }

    fn arrivals_at_stop<'a>(
        &'a self,
        stop_id: &'a StopIdentifier,
        window: TimeWindow,
    ) -> StoreFuture<'a, Vec<StopTime>> {
        (**self).arrivals_at_stop(stop_id, window)
    }

    fn stop_times_for_trips<'a>(
        &'a self,
        trip_ids: &'a [TripIdentifier],
    ) -> StoreFuture<'a, Vec<StopTime>> {
        (**self).stop_times_for_trips(trip_ids)
    }

    fn trip<'a>(&'a self, trip_id: &'a TripIdentifier) -> StoreFuture<'a, Option<Trip>> {
        (**self).trip(trip_id)
    }

    fn shape_points<'a>(&'a self, shape_id: &'a ShapeIdentifier) -> StoreFuture<'a, Vec<ShapePoint>> {
        (**self).shape_points(shape_id)
    }
}
