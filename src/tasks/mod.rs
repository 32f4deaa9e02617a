//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Sweep: Removes expired entries from a cache at a fixed interval
//! - Catalog Refresh: Repopulates every provider from its remote catalog

mod cleanup;
mod refresh;

pub use cleanup::{spawn_sweep_task, SweepHandle};
pub use refresh::spawn_refresh_task;
