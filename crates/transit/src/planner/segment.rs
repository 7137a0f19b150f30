//! Joining candidate stop times with their stops and cutting the chosen
//! trip down to the boarding..alighting range.

use std::collections::HashMap;

use geo::Point;
use tracing::warn;

use crate::identifiers::*;
use crate::models::{ServiceTime, Stop, StopTime};
use crate::planner::error::{PlanError, Result, StopRole};
use crate::spatial::Located;

/// A stop time together with the stop it calls at.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateStop {
    pub stop: Stop,
    pub stop_time: StopTime,
}

impl Located for CandidateStop {
    fn location(&self) -> Point {
        self.stop.location
    }
}

/// Inner join of `stop_times` with `stops`, ordered by trip then sequence.
///
/// Stop times whose stop is unknown are dropped.
pub fn join_candidates(
    stop_times: Vec<StopTime>,
    stops: &HashMap<&StopIdentifier, &Stop>,
) -> Vec<CandidateStop> {
    let mut joined: Vec<CandidateStop> = stop_times
        .into_iter()
        .filter_map(|stop_time| match stops.get(&stop_time.stop_id) {
            Some(stop) => Some(CandidateStop {
                stop: (*stop).clone(),
                stop_time,
            }),
            None => {
                warn!(
                    trip_id = %stop_time.trip_id,
                    stop_id = %stop_time.stop_id,
                    "dropping stop time with unknown stop"
                );
                None
            }
        })
        .collect();

    joined.sort_by(|a, b| {
        a.stop_time
            .trip_id
            .cmp(&b.stop_time.trip_id)
            .then(a.stop_time.stop_sequence.cmp(&b.stop_time.stop_sequence))
    });
    joined
}

/// The trip that calls at `boarding` latest without passing `reference`.
///
/// Ties keep the first row in `candidates` order.
pub fn choose_trip(
    candidates: &[CandidateStop],
    boarding: &StopIdentifier,
    reference: ServiceTime,
) -> Option<TripIdentifier> {
    let mut best: Option<(&TripIdentifier, ServiceTime)> = None;
    for row in candidates.iter().filter(|c| &c.stop.id == boarding) {
        let Some(arrival) = row.stop_time.arrival else {
            continue;
        };
        if arrival > reference {
            continue;
        }
        match best {
            Some((_, t)) if t >= arrival => {}
            _ => best = Some((&row.stop_time.trip_id, arrival)),
        }
    }
    best.map(|(id, _)| id.clone())
}

/// The inclusive slice of a trip between boarding and alighting.
#[derive(Clone, Debug, PartialEq)]
pub struct TripSegment {
    pub trip_id: TripIdentifier,
    /// Index of the boarding call within the trip's ordered calls
    pub boarding_index: usize,
    pub alighting_index: usize,
    /// Boarding call first, alighting call last
    pub stops: Vec<CandidateStop>,
}

impl TripSegment {
    pub fn first(&self) -> &CandidateStop {
        &self.stops[0]
    }

    pub fn last(&self) -> &CandidateStop {
        &self.stops[self.stops.len() - 1]
    }
}

/// Cut `trip_id`'s calls down to `boarding..=alighting`.
///
/// `candidates` may hold rows of other trips; only `trip_id`'s rows are used
/// and they must already be in sequence order. Boarding is the trip's first
/// call at the boarding stop, alighting the first call at the alighting stop
/// from there on.
pub fn extract_segment(
    trip_id: &TripIdentifier,
    candidates: &[CandidateStop],
    boarding: &StopIdentifier,
    alighting: &StopIdentifier,
) -> Result<TripSegment> {
    let calls: Vec<&CandidateStop> = candidates
        .iter()
        .filter(|c| &c.stop_time.trip_id == trip_id)
        .collect();

    let not_on_trip = |stop_id: &StopIdentifier, role| PlanError::StopNotOnTrip {
        trip_id: trip_id.clone(),
        stop_id: stop_id.clone(),
        role,
    };

    let boarding_index = calls
        .iter()
        .position(|c| &c.stop.id == boarding)
        .ok_or_else(|| not_on_trip(boarding, StopRole::Boarding))?;

    let alighting_index = match calls[boarding_index..]
        .iter()
        .position(|c| &c.stop.id == alighting)
    {
        Some(offset) => boarding_index + offset,
        None => {
            let earlier = calls[..boarding_index]
                .iter()
                .position(|c| &c.stop.id == alighting)
                .ok_or_else(|| not_on_trip(alighting, StopRole::Alighting))?;
            return Err(PlanError::InvalidSegmentOrder {
                trip_id: trip_id.clone(),
                boarding_index,
                alighting_index: earlier,
            });
        }
    };

    Ok(TripSegment {
        trip_id: trip_id.clone(),
        boarding_index,
        alighting_index,
        stops: calls[boarding_index..=alighting_index]
            .iter()
            .map(|c| (*c).clone())
            .collect(),
    })
}
