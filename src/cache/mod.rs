//! Cache Module
//!
//! Provides a generic in-memory cache with TTL expiration, a background
//! sweep, lazy enumeration and a bounded parallel map.

use std::time::Duration;

mod entry;
mod iter;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use crate::error::ParallelMapError;
pub use entry::CacheEntry;
pub use iter::{Entries, Values};
pub use store::TtlCache;

// == Public Constants ==
/// Interval between background sweeps unless configured otherwise
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);
