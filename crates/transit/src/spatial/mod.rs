//! Geographic distance and nearest-neighbour utilities.

pub mod queries;

pub use queries::{closest_on_segment, haversine_km, nearest, Located, Nearest, EARTH_RADIUS_KM};
