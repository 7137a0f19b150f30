//! Why a route could not be resolved, and at which stage.

use std::fmt;

use crate::identifiers::*;
use crate::models::TimeWindow;
use crate::store::StoreError;

/// Pipeline stage a failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    DestinationStop,
    TripSelection,
    CandidateStops,
    BoardingStop,
    Segment,
    TripLookup,
    Shape,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::DestinationStop => "destination-stop",
            Stage::TripSelection => "trip-selection",
            Stage::CandidateStops => "candidate-stops",
            Stage::BoardingStop => "boarding-stop",
            Stage::Segment => "segment",
            Stage::TripLookup => "trip-lookup",
            Stage::Shape => "shape",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopRole {
    Boarding,
    Alighting,
}

impl fmt::Display for StopRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopRole::Boarding => "boarding",
            StopRole::Alighting => "alighting",
        })
    }
}

/// Kind of record a dangling reference pointed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    Trip,
    Shape,
    /// A trip that carries no shape_id at all
    TripShape,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Trip => "trip",
            Entity::Shape => "shape",
            Entity::TripShape => "shape reference of trip",
        })
    }
}

/// Every way a route request can fail. All of them are terminal.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("{stage}: no candidate stops to search")]
    EmptyInput { stage: Stage },

    #[error("{stage}: no trip serves stop {stop_id} within {window}")]
    NoTripInWindow {
        stage: Stage,
        stop_id: StopIdentifier,
        window: TimeWindow,
    },

    #[error("segment: {role} stop {stop_id} is not visited by trip {trip_id}")]
    StopNotOnTrip {
        trip_id: TripIdentifier,
        stop_id: StopIdentifier,
        role: StopRole,
    },

    #[error(
        "segment: trip {trip_id} reaches the alighting stop (index {alighting_index}) \
         before the boarding stop (index {boarding_index})"
    )]
    InvalidSegmentOrder {
        trip_id: TripIdentifier,
        boarding_index: usize,
        alighting_index: usize,
    },

    #[error("shape: no point of shape {shape_id} within {tolerance_km} km of {role} stop {stop_id}")]
    ShapePointNotFound {
        shape_id: ShapeIdentifier,
        stop_id: StopIdentifier,
        role: StopRole,
        tolerance_km: f64,
    },

    #[error("{stage}: {source}")]
    StoreUnavailable {
        stage: Stage,
        #[source]
        source: StoreError,
    },

    #[error("{stage}: {entity} {id} does not exist")]
    MissingReference {
        stage: Stage,
        entity: Entity,
        id: String,
    },
}

impl PlanError {
    pub fn stage(&self) -> Stage {
        match self {
            PlanError::EmptyInput { stage }
            | PlanError::NoTripInWindow { stage, .. }
            | PlanError::StoreUnavailable { stage, .. }
            | PlanError::MissingReference { stage, .. } => *stage,
            PlanError::StopNotOnTrip { .. } | PlanError::InvalidSegmentOrder { .. } => Stage::Segment,
            PlanError::ShapePointNotFound { .. } => Stage::Shape,
        }
    }

    pub(crate) fn store(stage: Stage) -> impl FnOnce(StoreError) -> PlanError {
        move |source| PlanError::StoreUnavailable { stage, source }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
