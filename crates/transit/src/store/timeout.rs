//! Per-query deadline for any store.

use std::future::Future;
use std::time::Duration;

use crate::identifiers::*;
use crate::models::{ShapePoint, Stop, StopTime, TimeWindow, Trip};
use crate::store::traits::{StoreError, StoreFuture, StoreResult, TransitStore};

/// Wraps a store so that every query fails with [`StoreError::TimedOut`]
/// once `limit` elapses. The inner query future is dropped at that point.
///
/// Requires a tokio runtime with the time driver enabled.
#[derive(Clone)]
pub struct TimeoutStore<S> {
    inner: S,
    limit: Duration,
}

impl<S> TimeoutStore<S> {
    pub fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn guard<'a, T, F>(&self, query: F) -> StoreFuture<'a, T>
    where
        F: Future<Output = StoreResult<T>> + Send + 'a,
        T: 'a,
    {
        let limit = self.limit;
        Box::pin(async move {
            match tokio::time::timeout(limit, query).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::TimedOut(limit)),
            }
        })
    }
}

impl<S: TransitStore> TransitStore for TimeoutStore<S> {
    fn all_stops<'a>(&'a self) -> StoreFuture<'a, Vec<Stop>> {
        self.guard(self.inner.all_stops())
    }

    fn arrivals_at_stop<'a>(
        &'a self,
        stop_id: &'a StopIdentifier,
        window: TimeWindow,
    ) -> StoreFuture<'a, Vec<StopTime>> {
        self.guard(self.inner.arrivals_at_stop(stop_id, window))
    }

    fn stop_times_for_trips<'a>(
        &'a self,
        trip_ids: &'a [TripIdentifier],
    ) -> StoreFuture<'a, Vec<StopTime>> {
        self.guard(self.inner.stop_times_for_trips(trip_ids))
    }

    fn trip<'a>(&'a self, trip_id: &'a TripIdentifier) -> StoreFuture<'a, Option<Trip>> {
        self.guard(self.inner.trip(trip_id))
    }

    fn shape_points<'a>(&'a self, shape_id: &'a ShapeIdentifier) -> StoreFuture<'a, Vec<ShapePoint>> {
        self.guard(self.inner.shape_points(shape_id))
    }
}
