//! Feed identifiers.
//!
//! GTFS ids are opaque strings. Each entity kind gets its own newtype so a
//! stop id can never be passed where a trip id is expected. Clones share
//! the underlying `Arc<str>`.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

macro_rules! feed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(Arc::from(id.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        // Hash and Eq agree with str, so maps keyed by id accept &str lookups.
        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(Arc::from(id))
            }
        }
    };
}

feed_id!(
    /// `stops.stop_id`
    StopIdentifier
);
feed_id!(
    /// `trips.trip_id`
    TripIdentifier
);
feed_id!(
    /// `shapes.shape_id`
    ShapeIdentifier
);
feed_id!(RouteIdentifier);
feed_id!(ServiceIdentifier);
