//! Planner defaults.

use chrono::TimeDelta;

use crate::models::ServiceTime;

/// Reference time used when a request does not name one.
pub const DEFAULT_REFERENCE_TIME: ServiceTime = ServiceTime::from_hms(16, 30, 0);

/// How far before the reference time a trip may arrive, in minutes.
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 60;

/// How stops are pinned onto a shape polyline.
///
/// A shape point matches a stop when both coordinates agree after rounding
/// to `precision_decimals`. If no point does, the nearest point is used as
/// long as it lies within `fallback_tolerance_km`; beyond that the request
/// fails.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeMatchPolicy {
    pub precision_decimals: u32,
    pub fallback_tolerance_km: f64,
}

impl Default for ShapeMatchPolicy {
    fn default() -> Self {
        Self {
            precision_decimals: 3,
            fallback_tolerance_km: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannerConfig {
    pub reference_time: ServiceTime,
    pub lookback: TimeDelta,
    pub shape_match: ShapeMatchPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            reference_time: DEFAULT_REFERENCE_TIME,
            lookback: TimeDelta::minutes(DEFAULT_LOOKBACK_MINUTES),
            shape_match: ShapeMatchPolicy::default(),
        }
    }
}
