//! Route resolution: nearest stops, trip choice, segment and shape trimming.
//!
//! Each request runs the stages strictly in order, since every stage's
//! output parameterizes the next store query:
//!
//! 1. nearest stop to the destination
//! 2. trips arriving there within the lookback window
//! 3. all calls of those trips, joined with their stops
//! 4. nearest of those calls to the origin (boarding stop), and the trip that
//!    calls there latest without passing the reference time
//! 5. the chosen trip's calls from boarding to alighting
//! 6. the trip's shape, trimmed to the same stretch
//!
//! Nothing is cached between requests; a planner can be shared freely.

pub mod config;
pub mod error;
pub mod result;
pub mod segment;
pub mod shape;
pub mod trip_selector;

use std::collections::HashMap;

use chrono::TimeDelta;
use geo::Point;
use tracing::{debug, instrument};

use crate::identifiers::StopIdentifier;
use crate::models::{ServiceTime, Stop, TimeWindow};
use crate::spatial::nearest;
use crate::store::TransitStore;

pub use config::{PlannerConfig, ShapeMatchPolicy, DEFAULT_LOOKBACK_MINUTES, DEFAULT_REFERENCE_TIME};
pub use error::{Entity, PlanError, Result, Stage, StopRole};
pub use result::{RouteResult, SegmentStop, StopMatch};

/// Everything a single request needs besides the store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteQuery {
    pub origin: Point,
    pub destination: Point,
    pub reference_time: ServiceTime,
    pub lookback: TimeDelta,
}

impl RouteQuery {
    /// A query at the default reference time and lookback.
    pub fn new(origin: Point, destination: Point) -> Self {
        let defaults = PlannerConfig::default();
        Self {
            origin,
            destination,
            reference_time: defaults.reference_time,
            lookback: defaults.lookback,
        }
    }

    pub fn at(mut self, reference_time: ServiceTime) -> Self {
        self.reference_time = reference_time;
        self
    }

    pub fn with_lookback(mut self, lookback: TimeDelta) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::looking_back(self.reference_time, self.lookback)
    }
}

/// Resolves routes against a shared, read-only store.
#[derive(Clone)]
pub struct RoutePlanner<S> {
    store: S,
    config: PlannerConfig,
}

impl<S: TransitStore> RoutePlanner<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, PlannerConfig::default())
    }

    pub fn with_config(store: S, config: PlannerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve at the configured reference time and lookback.
    pub async fn resolve_route(&self, origin: Point, destination: Point) -> Result<RouteResult> {
        let query = RouteQuery::new(origin, destination)
            .at(self.config.reference_time)
            .with_lookback(self.config.lookback);
        self.resolve(&query).await
    }

    #[instrument(
        skip(self, query),
        fields(
            origin = ?(query.origin.y(), query.origin.x()),
            destination = ?(query.destination.y(), query.destination.x()),
            at = %query.reference_time,
        )
    )]
    pub async fn resolve(&self, query: &RouteQuery) -> Result<RouteResult> {
        let window = query.window();

        let stops = self
            .store
            .all_stops()
            .await
            .map_err(PlanError::store(Stage::DestinationStop))?;
        let alighting = nearest(query.destination, &stops)
            .map(|n| StopMatch {
                stop: n.item.clone(),
                distance_km: n.distance_km,
            })
            .ok_or(PlanError::EmptyInput {
                stage: Stage::DestinationStop,
            })?;
        debug!(stop_id = %alighting.stop.id, distance_km = alighting.distance_km, "destination stop");

        let trip_ids = trip_selector::select_trips(&self.store, &alighting.stop.id, window).await?;

        let stop_times = self
            .store
            .stop_times_for_trips(&trip_ids)
            .await
            .map_err(PlanError::store(Stage::CandidateStops))?;
        let stop_index: HashMap<&StopIdentifier, &Stop> = stops.iter().map(|s| (&s.id, s)).collect();
        let candidates = segment::join_candidates(stop_times, &stop_index);

        let boarding = nearest(query.origin, &candidates)
            .map(|n| StopMatch {
                stop: n.item.stop.clone(),
                distance_km: n.distance_km,
            })
            .ok_or(PlanError::EmptyInput {
                stage: Stage::BoardingStop,
            })?;
        debug!(stop_id = %boarding.stop.id, distance_km = boarding.distance_km, "boarding stop");

        let trip_id = segment::choose_trip(&candidates, &boarding.stop.id, query.reference_time)
            .ok_or_else(|| PlanError::NoTripInWindow {
                stage: Stage::BoardingStop,
                stop_id: boarding.stop.id.clone(),
                window,
            })?;
        let segment =
            segment::extract_segment(&trip_id, &candidates, &boarding.stop.id, &alighting.stop.id)?;
        debug!(
            trip_id = %trip_id,
            from = segment.boarding_index,
            to = segment.alighting_index,
            "chosen trip"
        );

        let trip = self
            .store
            .trip(&trip_id)
            .await
            .map_err(PlanError::store(Stage::TripLookup))?
            .ok_or_else(|| PlanError::MissingReference {
                stage: Stage::TripLookup,
                entity: Entity::Trip,
                id: trip_id.to_string(),
            })?;
        let shape_id = trip.shape_id.clone().ok_or_else(|| PlanError::MissingReference {
            stage: Stage::Shape,
            entity: Entity::TripShape,
            id: trip.id.to_string(),
        })?;

        let points = self
            .store
            .shape_points(&shape_id)
            .await
            .map_err(PlanError::store(Stage::Shape))?;
        if points.is_empty() {
            return Err(PlanError::MissingReference {
                stage: Stage::Shape,
                entity: Entity::Shape,
                id: shape_id.to_string(),
            });
        }
        let shape = shape::trim_shape(
            &shape_id,
            points,
            &segment.first().stop,
            &segment.last().stop,
            &self.config.shape_match,
        )?;

        let first = segment.first();
        let duration = segment
            .last()
            .stop_time
            .arrival
            .zip(first.stop_time.departure.or(first.stop_time.arrival))
            .and_then(|(arrive, depart)| arrive.since(depart));

        Ok(RouteResult {
            origin: query.origin,
            destination: query.destination,
            boarding,
            alighting,
            trip,
            path: shape.path,
            stops: segment.stops.into_iter().map(SegmentStop::from).collect(),
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::*;
    use crate::models::{ShapePoint, StopTime, Trip};
    use crate::store::{MemoryStore, StoreError, StoreFuture};
    use std::sync::Arc;

    fn t(s: &str) -> ServiceTime {
        s.parse().unwrap()
    }

    fn trip(id: &str, shape: Option<&str>) -> Trip {
        Trip {
            id: TripIdentifier::new(id),
            route_id: RouteIdentifier::new("R1"),
            service_id: ServiceIdentifier::new("WK"),
            shape_id: shape.map(ShapeIdentifier::new),
            headsign: Some("C".into()),
            direction: None,
        }
    }

    fn abc_stops() -> Vec<Stop> {
        vec![
            Stop::new("A", "Alpha", 0.0, 0.0),
            Stop::new("B", "Beta", 0.0, 1.0),
            Stop::new("C", "Gamma", 0.0, 2.0),
        ]
    }

    fn abc_shape() -> Vec<ShapePoint> {
        vec![
            ShapePoint::new("S1", 0.0, 0.0, 1),
            ShapePoint::new("S1", 0.0, 1.0, 2),
            ShapePoint::new("S1", 0.0, 2.0, 3),
        ]
    }

    /// Stops A(0,0), B(0,1), C(0,2); trip T1 calls at 16:00, 16:15, 16:30.
    fn abc_store() -> MemoryStore {
        MemoryStore::from_data(
            abc_stops(),
            vec![trip("T1", Some("S1"))],
            vec![
                StopTime::new("T1", "A", t("16:00:00"), t("16:00:00"), 1),
                StopTime::new("T1", "B", t("16:15:00"), t("16:15:00"), 2),
                StopTime::new("T1", "C", t("16:30:00"), t("16:30:00"), 3),
            ],
            abc_shape(),
        )
    }

    fn near_a() -> Point {
        Point::new(0.01, 0.0)
    }

    fn near_c() -> Point {
        Point::new(1.99, 0.0)
    }

    fn ids(result: &RouteResult) -> Vec<&str> {
        result.stops.iter().map(|s| s.stop.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_resolve_route_uses_configured_time() {
        let config = PlannerConfig {
            reference_time: t("15:00:00"),
            ..PlannerConfig::default()
        };
        let planner = RoutePlanner::with_config(abc_store(), config);
        assert_eq!(planner.config().reference_time, t("15:00:00"));
        assert_eq!(planner.store().stop_count(), 3);

        let err = planner.resolve_route(near_a(), near_c()).await.unwrap_err();
        assert_eq!(err.stage(), Stage::TripSelection);
    }

    #[tokio::test]
    async fn test_end_to_end_abc() {
        let planner = RoutePlanner::new(abc_store());
        let result = planner.resolve_route(near_a(), near_c()).await.unwrap();

        assert_eq!(result.boarding.stop.id.as_str(), "A");
        assert_eq!(result.alighting.stop.id.as_str(), "C");
        assert_eq!(ids(&result), ["A", "B", "C"]);
        assert_eq!(result.path.0.len(), 3);
        assert_eq!(result.trip.id.as_str(), "T1");
        assert_eq!(result.duration, Some(TimeDelta::minutes(30)));
        assert_eq!(result.origin, near_a());
        assert_eq!(result.destination, near_c());
        assert!(result.boarding.distance_km > 1.0 && result.boarding.distance_km < 1.2);
    }

    #[tokio::test]
    async fn test_no_trip_in_window_is_an_error() {
        let planner = RoutePlanner::new(abc_store());
        let query = RouteQuery::new(near_a(), near_c()).at(t("15:00:00"));

        let err = planner.resolve(&query).await.unwrap_err();
        assert!(matches!(
            err,
            PlanError::NoTripInWindow { stage: Stage::TripSelection, ref stop_id, .. } if stop_id.as_str() == "C"
        ));
    }

    #[tokio::test]
    async fn test_narrow_lookback_excludes_trip() {
        let planner = RoutePlanner::new(abc_store());
        let query = RouteQuery::new(near_a(), near_c())
            .at(t("16:45:00"))
            .with_lookback(TimeDelta::minutes(10));

        let err = planner.resolve(&query).await.unwrap_err();
        assert_eq!(err.stage(), Stage::TripSelection);
    }

    #[tokio::test]
    async fn test_reversed_direction_is_invalid_segment() {
        let planner = RoutePlanner::new(abc_store());
        let err = planner.resolve_route(near_c(), near_a()).await.unwrap_err();

        match err {
            PlanError::InvalidSegmentOrder {
                trip_id,
                boarding_index,
                alighting_index,
            } => {
                assert_eq!(trip_id.as_str(), "T1");
                assert_eq!(boarding_index, 2);
                assert_eq!(alighting_index, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_same_stop_gives_degenerate_route() {
        let planner = RoutePlanner::new(abc_store());
        let result = planner
            .resolve_route(Point::new(1.01, 0.0), Point::new(0.99, 0.0))
            .await
            .unwrap();

        assert_eq!(ids(&result), ["B"]);
        assert_eq!(result.path.0.len(), 1);
        assert_eq!(result.duration, Some(TimeDelta::zero()));
    }

    #[tokio::test]
    async fn test_picks_latest_trip_at_boarding_stop() {
        let store = MemoryStore::from_data(
            abc_stops(),
            vec![trip("T1", Some("S1")), trip("T2", Some("S1"))],
            vec![
                StopTime::new("T1", "A", t("16:00:00"), t("16:00:00"), 1),
                StopTime::new("T1", "B", t("16:15:00"), t("16:15:00"), 2),
                StopTime::new("T1", "C", t("16:30:00"), t("16:30:00"), 3),
                StopTime::new("T2", "A", t("15:20:00"), t("15:20:00"), 1),
                StopTime::new("T2", "B", t("15:35:00"), t("15:35:00"), 2),
                StopTime::new("T2", "C", t("15:50:00"), t("15:50:00"), 3),
            ],
            abc_shape(),
        );
        let planner = RoutePlanner::new(store);

        let result = planner.resolve_route(near_a(), near_c()).await.unwrap();
        assert_eq!(result.trip.id.as_str(), "T1");

        let earlier = RouteQuery::new(near_a(), near_c()).at(t("16:10:00"));
        let result = planner.resolve(&earlier).await.unwrap();
        assert_eq!(result.trip.id.as_str(), "T2");
    }

    #[tokio::test]
    async fn test_empty_store_is_empty_input() {
        let planner = RoutePlanner::new(MemoryStore::new());
        let err = planner.resolve_route(near_a(), near_c()).await.unwrap_err();
        assert!(matches!(err, PlanError::EmptyInput { stage: Stage::DestinationStop }));
    }

    #[tokio::test]
    async fn test_missing_trip_record() {
        let store = MemoryStore::from_data(
            abc_stops(),
            vec![],
            vec![
                StopTime::new("T1", "A", t("16:00:00"), t("16:00:00"), 1),
                StopTime::new("T1", "C", t("16:30:00"), t("16:30:00"), 2),
            ],
            abc_shape(),
        );
        let err = RoutePlanner::new(store)
            .resolve_route(near_a(), near_c())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::MissingReference { stage: Stage::TripLookup, entity: Entity::Trip, .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_shape() {
        let store = MemoryStore::from_data(
            abc_stops(),
            vec![trip("T1", Some("nowhere"))],
            vec![
                StopTime::new("T1", "A", t("16:00:00"), t("16:00:00"), 1),
                StopTime::new("T1", "C", t("16:30:00"), t("16:30:00"), 2),
            ],
            abc_shape(),
        );
        let err = RoutePlanner::new(store)
            .resolve_route(near_a(), near_c())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::MissingReference { entity: Entity::Shape, ref id, .. } if id == "nowhere"
        ));
    }

    #[tokio::test]
    async fn test_shape_far_from_stops() {
        let far_shape = vec![
            ShapePoint::new("S1", 1.0, 0.0, 1),
            ShapePoint::new("S1", 1.0, 2.0, 2),
        ];
        let store = MemoryStore::from_data(
            abc_stops(),
            vec![trip("T1", Some("S1"))],
            vec![
                StopTime::new("T1", "A", t("16:00:00"), t("16:00:00"), 1),
                StopTime::new("T1", "C", t("16:30:00"), t("16:30:00"), 2),
            ],
            far_shape,
        );
        let err = RoutePlanner::new(store)
            .resolve_route(near_a(), near_c())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::ShapePointNotFound { role: StopRole::Boarding, .. }
        ));
    }

    struct Offline;

    impl TransitStore for Offline {
        fn all_stops<'a>(&'a self) -> StoreFuture<'a, Vec<Stop>> {
            Box::pin(async { Err::<Vec<Stop>, _>(StoreError::Unavailable("no route to host".into())) })
        }

        fn arrivals_at_stop<'a>(
            &'a self,
            _stop_id: &'a StopIdentifier,
            _window: TimeWindow,
        ) -> StoreFuture<'a, Vec<StopTime>> {
            Box::pin(async { Ok::<_, StoreError>(Vec::<StopTime>::new()) })
        }

        fn stop_times_for_trips<'a>(
            &'a self,
            _trip_ids: &'a [TripIdentifier],
        ) -> StoreFuture<'a, Vec<StopTime>> {
            Box::pin(async { Ok::<_, StoreError>(Vec::<StopTime>::new()) })
        }

        fn trip<'a>(&'a self, _trip_id: &'a TripIdentifier) -> StoreFuture<'a, Option<Trip>> {
            Box::pin(async { Ok::<Option<Trip>, StoreError>(None) })
        }

        fn shape_points<'a>(&'a self, _shape_id: &'a ShapeIdentifier) -> StoreFuture<'a, Vec<ShapePoint>> {
            Box::pin(async { Ok::<_, StoreError>(Vec::<ShapePoint>::new()) })
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_with_stage() {
        let err = RoutePlanner::new(Offline)
            .resolve_route(near_a(), near_c())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::StoreUnavailable {
                stage: Stage::DestinationStop,
                source: StoreError::Unavailable(_),
            }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_requests_share_one_store() {
        let planner = Arc::new(RoutePlanner::new(Arc::new(abc_store())));

        let forward = {
            let planner = planner.clone();
            tokio::spawn(async move { planner.resolve_route(near_a(), near_c()).await })
        };
        let backward = {
            let planner = planner.clone();
            tokio::spawn(async move { planner.resolve_route(near_c(), near_a()).await })
        };

        let forward = forward.await.unwrap().unwrap();
        assert_eq!(ids(&forward), ["A", "B", "C"]);
        assert!(backward.await.unwrap().is_err());

        // The failed request left nothing behind
        let again = planner.resolve_route(near_a(), near_c()).await.unwrap();
        assert_eq!(again, forward);
    }
}
