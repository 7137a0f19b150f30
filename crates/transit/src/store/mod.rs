//! Read-only access to stop, trip, stop time and shape reference data.

#[cfg(feature = "feed")]
pub mod feed;
pub mod memory;
pub mod timeout;
pub mod traits;

pub use memory::MemoryStore;
pub use timeout::TimeoutStore;
pub use traits::{StoreError, StoreFuture, StoreResult, TransitStore};
