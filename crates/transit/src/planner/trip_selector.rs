//! Finding the trips that reach a stop shortly before the reference time.

use std::collections::HashSet;

use tracing::debug;

use crate::identifiers::*;
use crate::models::{StopTime, TimeWindow};
use crate::planner::error::{PlanError, Result, Stage};
use crate::store::TransitStore;

/// Trips with an arrival at `stop_id` inside `window`, latest arrival first.
///
/// An empty result is an error: a request with no serving trip must not
/// turn into an empty route.
pub async fn select_trips<S: TransitStore + ?Sized>(
    store: &S,
    stop_id: &StopIdentifier,
    window: TimeWindow,
) -> Result<Vec<TripIdentifier>> {
    let arrivals = store
        .arrivals_at_stop(stop_id, window)
        .await
        .map_err(PlanError::store(Stage::TripSelection))?;

    let trips = rank_by_arrival(arrivals, window);
    debug!(stop_id = %stop_id, %window, candidates = trips.len(), "selected trips");

    if trips.is_empty() {
        return Err(PlanError::NoTripInWindow {
            stage: Stage::TripSelection,
            stop_id: stop_id.clone(),
            window,
        });
    }
    Ok(trips)
}

/// Order arrivals latest-first and keep each trip once, at its best rank.
///
/// Rows outside `window` or without an arrival time are ignored, so the
/// result does not depend on how strictly the store filtered.
pub fn rank_by_arrival(mut arrivals: Vec<StopTime>, window: TimeWindow) -> Vec<TripIdentifier> {
    arrivals.retain(|st| st.arrival.is_some_and(|t| window.contains(t)));
    arrivals.sort_by(|a, b| b.arrival.cmp(&a.arrival));

    let mut seen = HashSet::new();
    arrivals
        .into_iter()
        .filter(|st| seen.insert(st.trip_id.clone()))
        .map(|st| st.trip_id)
        .collect()
}
