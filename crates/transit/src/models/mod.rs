//! Transit data models and schedule time.

pub mod time;
pub mod types;

// Re-exports for convenience
pub use time::{ParseServiceTimeError, ServiceTime, TimeWindow};
pub use types::{DirectionId, ShapePoint, Stop, StopTime, Trip};
