//! Trimming a trip's shape to the part actually ridden.

use geo::{LineString, Point};
use tracing::{debug, warn};

use crate::identifiers::*;
use crate::models::{ShapePoint, Stop};
use crate::planner::config::ShapeMatchPolicy;
use crate::planner::error::{PlanError, Result, StopRole};
use crate::spatial::{closest_on_segment, haversine_km, Located};

/// Where a stop landed on a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeMatch {
    /// Shape point at, or immediately before, `location`
    pub index: usize,
    pub location: Point,
    pub distance_km: f64,
    /// False when the point came from the nearest-point fallback
    pub exact: bool,
    /// `location` lies strictly inside the segment following `index`
    pub between: bool,
}

impl ShapeMatch {
    fn vertex(index: usize, location: Point, target: Point, exact: bool) -> Self {
        Self {
            index,
            location,
            distance_km: haversine_km(target, location),
            exact,
            between: false,
        }
    }
}

fn rounded(value: f64, decimals: u32) -> i64 {
    (value * 10f64.powi(decimals as i32)).round() as i64
}

/// Locate `target` on the polyline through `points` according to `policy`.
///
/// A shape point whose rounded coordinates equal the target's wins outright.
/// Otherwise the target is projected onto every segment and the closest
/// projection is used if it is within the fallback tolerance. Ties keep the
/// earliest segment.
pub fn match_point<T: Located>(points: &[T], target: Point, policy: &ShapeMatchPolicy) -> Option<ShapeMatch> {
    let key = |p: Point| {
        (
            rounded(p.y(), policy.precision_decimals),
            rounded(p.x(), policy.precision_decimals),
        )
    };
    let wanted = key(target);

    if let Some(index) = points.iter().position(|pt| key(pt.location()) == wanted) {
        return Some(ShapeMatch::vertex(index, points[index].location(), target, true));
    }

    let mut best = match points {
        [only] => Some(ShapeMatch::vertex(0, only.location(), target, false)),
        _ => None,
    };
    for (index, pair) in points.windows(2).enumerate() {
        let (a, b) = (pair[0].location(), pair[1].location());
        let Some((on_line, distance_km)) = closest_on_segment(target, a, b) else {
            continue;
        };
        if best.is_some_and(|m| m.distance_km <= distance_km) {
            continue;
        }
        best = Some(if on_line == a {
            ShapeMatch::vertex(index, a, target, false)
        } else if on_line == b {
            ShapeMatch::vertex(index + 1, b, target, false)
        } else {
            ShapeMatch {
                index,
                location: on_line,
                distance_km,
                exact: false,
                between: true,
            }
        });
    }
    best.filter(|m| m.distance_km <= policy.fallback_tolerance_km)
}

/// The ridden part of a shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeSegment {
    pub shape_id: ShapeIdentifier,
    pub boarding: ShapeMatch,
    /// Index is relative to the full, sequence ordered shape
    pub alighting: ShapeMatch,
    pub path: LineString,
}

/// Cut `points` down to the stretch between `boarding` and `alighting`.
///
/// Points are put in sequence order first. The alighting stop is only
/// searched for from where the boarding stop landed, so the path never runs
/// backwards. A stop matched between two shape points contributes its
/// projected location as the path's end. Boarding and alighting on the same
/// point gives a one-point path.
pub fn trim_shape(
    shape_id: &ShapeIdentifier,
    mut points: Vec<ShapePoint>,
    boarding: &Stop,
    alighting: &Stop,
    policy: &ShapeMatchPolicy,
) -> Result<ShapeSegment> {
    points.sort_by_key(|pt| pt.sequence);
    let vertices: Vec<Point> = points.iter().map(|pt| pt.location).collect();

    let not_found = |stop: &Stop, role| PlanError::ShapePointNotFound {
        shape_id: shape_id.clone(),
        stop_id: stop.id.clone(),
        role,
        tolerance_km: policy.fallback_tolerance_km,
    };

    let start = match_point(&vertices, boarding.location, policy)
        .ok_or_else(|| not_found(boarding, StopRole::Boarding))?;

    // Rest of the line, starting exactly where boarding landed
    let mut rest = Vec::with_capacity(vertices.len() - start.index);
    rest.push(start.location);
    rest.extend_from_slice(&vertices[start.index + 1..]);

    let mut end = match_point(&rest, alighting.location, policy)
        .ok_or_else(|| not_found(alighting, StopRole::Alighting))?;

    let mut path: LineString = rest[..=end.index].iter().map(|p| p.0).collect();
    if end.between {
        path.0.push(end.location.0);
    }
    end.index += start.index;

    for (stop, m) in [(boarding, &start), (alighting, &end)] {
        if !m.exact {
            warn!(
                shape_id = %shape_id,
                stop_id = %stop.id,
                distance_km = m.distance_km,
                "no exact shape point for stop, using nearest point on shape"
            );
        }
    }
    debug!(shape_id = %shape_id, from = start.index, to = end.index, points = path.0.len(), "trimmed shape");

    Ok(ShapeSegment {
        shape_id: shape_id.clone(),
        boarding: start,
        alighting: end,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn shape(coords: &[(f64, f64)]) -> Vec<ShapePoint> {
        coords
            .iter()
            .enumerate()
            .map(|(i, (lat, lon))| ShapePoint::new("S", *lat, *lon, (i as u32 + 1) * 10))
            .collect()
    }

    fn stop(id: &str, lat: f64, lon: f64) -> Stop {
        Stop::new(id, id, lat, lon)
    }

    fn sid() -> ShapeIdentifier {
        ShapeIdentifier::new("S")
    }

    #[test]
    fn test_exact_rounded_match() {
        let points = shape(&[(39.2001, 9.1001), (39.2104, 9.1104), (39.2203, 9.1202)]);
        let m = match_point(&points, Point::new(9.11036, 39.21044), &ShapeMatchPolicy::default()).unwrap();
        assert_eq!(m.index, 1);
        assert!(m.exact);
    }

    #[test]
    fn test_fallback_projects_onto_segment() {
        // ~110 m north of the middle of a ~1.1 km segment
        let points = shape(&[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02)]);
        let m = match_point(&points, Point::new(0.015, 0.001), &ShapeMatchPolicy::default()).unwrap();
        assert_eq!(m.index, 1);
        assert!(!m.exact);
        assert!(m.between);
        assert_relative_eq!(m.location.x(), 0.015, epsilon = 1e-12);
        assert_relative_eq!(m.distance_km, haversine_km(Point::new(0.015, 0.001), Point::new(0.015, 0.0)), epsilon = 1e-9);
    }

    #[test]
    fn test_fallback_clamped_to_shape_end_is_a_vertex() {
        let points = shape(&[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02)]);
        let m = match_point(&points, Point::new(0.0215, 0.0), &ShapeMatchPolicy::default()).unwrap();
        assert_eq!(m.index, 2);
        assert!(!m.between);
        assert_eq!(m.location, Point::new(0.02, 0.0));
    }

    #[test]
    fn test_single_point_shape_fallback() {
        let points = shape(&[(0.0, 0.0)]);
        let m = match_point(&points, Point::new(0.0007, 0.0), &ShapeMatchPolicy::default()).unwrap();
        assert_eq!(m.index, 0);
        assert!(!m.exact);
    }

    #[test]
    fn test_stop_on_sparse_shape_between_points() {
        let points = shape(&[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02)]);
        let segment = trim_shape(
            &sid(),
            points,
            &stop("A", 0.0, 0.0),
            &stop("B", 0.0, 0.015),
            &ShapeMatchPolicy::default(),
        )
        .unwrap();

        assert!(segment.boarding.exact);
        assert!(segment.alighting.between);
        assert_eq!(segment.alighting.index, 1);
        assert!(segment.alighting.distance_km < 1e-6);

        let lons: Vec<f64> = segment.path.points().map(|p| p.x()).collect();
        assert_eq!(lons.len(), 3);
        assert_eq!(&lons[..2], [0.0, 0.01]);
        assert_relative_eq!(lons[2], 0.015, epsilon = 1e-12);
    }

    #[test]
    fn test_both_stops_inside_one_segment() {
        let points = shape(&[(0.0, 0.0), (0.0, 0.01)]);
        let segment = trim_shape(
            &sid(),
            points,
            &stop("A", 0.0005, 0.0025),
            &stop("B", 0.0005, 0.0075),
            &ShapeMatchPolicy::default(),
        )
        .unwrap();

        assert_eq!(segment.boarding.index, 0);
        assert_eq!(segment.alighting.index, 0);
        let lons: Vec<f64> = segment.path.points().map(|p| p.x()).collect();
        assert_eq!(lons.len(), 2);
        assert_relative_eq!(lons[0], 0.0025, epsilon = 1e-12);
        assert_relative_eq!(lons[1], 0.0075, epsilon = 1e-12);
    }

    #[test]
    fn test_no_match_beyond_tolerance() {
        let points = shape(&[(0.0, 0.0), (0.0, 0.01)]);
        let policy = ShapeMatchPolicy::default();
        assert!(match_point(&points, Point::new(0.5, 0.5), &policy).is_none());

        let err = trim_shape(&sid(), points, &stop("far", 0.5, 0.5), &stop("A", 0.0, 0.0), &policy)
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::ShapePointNotFound { role: StopRole::Boarding, ref stop_id, .. } if stop_id.as_str() == "far"
        ));
    }

    #[test]
    fn test_trim_inclusive_range_in_sequence_order() {
        let mut points = shape(&[(0.0, 0.0), (0.0, 0.5), (0.0, 1.0), (0.0, 1.5), (0.0, 2.0)]);
        points.reverse();

        let segment = trim_shape(
            &sid(),
            points,
            &stop("B", 0.0, 0.5),
            &stop("D", 0.0, 1.5),
            &ShapeMatchPolicy::default(),
        )
        .unwrap();

        let lons: Vec<f64> = segment.path.points().map(|p| p.x()).collect();
        assert_eq!(lons, [0.5, 1.0, 1.5]);
        assert_eq!(segment.boarding.index, 1);
        assert_eq!(segment.alighting.index, 3);
    }

    #[test]
    fn test_same_boarding_and_alighting_is_single_point() {
        let points = shape(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
        let b = stop("B", 0.0, 1.0);

        let segment = trim_shape(&sid(), points, &b, &b, &ShapeMatchPolicy::default()).unwrap();
        assert_eq!(segment.path.0.len(), 1);
        assert_eq!(segment.path.0[0].x, 1.0);
    }

    #[test]
    fn test_alighting_searched_after_boarding() {
        // Loop shape: the alighting stop sits at both ends
        let points = shape(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (0.0, 0.0)]);
        let segment = trim_shape(
            &sid(),
            points,
            &stop("B", 0.0, 1.0),
            &stop("A", 0.0, 0.0),
            &ShapeMatchPolicy::default(),
        )
        .unwrap();
        assert_eq!(segment.boarding.index, 1);
        assert_eq!(segment.alighting.index, 3);
        assert_eq!(segment.path.0.len(), 3);
    }
}
