//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula for great-circle distances on Earth's surface.

use geo::{Closest, ClosestPoint, Line, Point};

use crate::models::types::{ShapePoint, Stop};

/// Earth radius used for every distance the planner reports.
pub const EARTH_RADIUS_KM: f64 = 6367.0;

/// Great-circle distance between two points in kilometers.
///
/// Points are `geo` points (x = longitude, y = latitude, in degrees). Out of
/// range coordinates are not rejected; they simply produce a meaningless
/// number.
pub fn haversine_km(p1: Point, p2: Point) -> f64 {
    let (lat1, lon1) = (p1.y().to_radians(), p1.x().to_radians());
    let (lat2, lon2) = (p2.y().to_radians(), p2.x().to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Closest point to `target` on the segment `start`..`end`, with its
/// great-circle distance from `target`.
///
/// The projection is planar in degrees, which is fine at shape-segment
/// scale. Returns `None` only when `geo` cannot decide (NaN input).
pub fn closest_on_segment(target: Point, start: Point, end: Point) -> Option<(Point, f64)> {
    if start == end {
        return Some((start, haversine_km(target, start)));
    }
    match Line::new(start.0, end.0).closest_point(&target) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => Some((p, haversine_km(target, p))),
        Closest::Indeterminate => None,
    }
}

/// Anything with a position on the map.
pub trait Located {
    fn location(&self) -> Point;
}

impl Located for Stop {
    fn location(&self) -> Point {
        self.location
    }
}

impl Located for ShapePoint {
    fn location(&self) -> Point {
        self.location
    }
}

impl Located for Point {
    fn location(&self) -> Point {
        *self
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn location(&self) -> Point {
        (**self).location()
    }
}

/// Result of a nearest-neighbour search.
#[derive(Clone, Copy, Debug)]
pub struct Nearest<'a, T> {
    pub index: usize,
    pub item: &'a T,
    pub distance_km: f64,
}

/// Find the candidate closest to `target`.
///
/// Linear scan; when several candidates are exactly equidistant the first in
/// input order wins. Returns `None` for an empty slice.
pub fn nearest<T: Located>(target: Point, candidates: &[T]) -> Option<Nearest<'_, T>> {
    let mut best: Option<Nearest<'_, T>> = None;
    for (index, item) in candidates.iter().enumerate() {
        let distance_km = haversine_km(target, item.location());
        match &best {
            Some(b) if b.distance_km <= distance_km => {}
            _ => {
                best = Some(Nearest {
                    index,
                    item,
                    distance_km,
                })
            }
        }
    }
    best
}
