//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::hash::Hash;
use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::cache::TtlCache;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task only holds a weak reference: it exits on its own once the last
/// strong handle to the cache is dropped.
///
/// # Arguments
/// * `cache` - weak reference to the cache to sweep
/// * `interval` - time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
pub fn spawn_sweep_task<K, V>(cache: Weak<TtlCache<K, V>>, interval: Duration) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    tokio::spawn(async move {
        debug!(?interval, "Starting TTL sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let Some(strong) = cache.upgrade() else {
                debug!("Cache dropped, stopping TTL sweep task");
                return;
            };

            let removed = strong.cleanup_expired();

            if removed > 0 {
                debug!(removed, "TTL sweep: removed expired entries");
            } else {
                trace!("TTL sweep: no expired entries found");
            }
        }
    })
}

// == Sweep Handle ==
/// Owns a cache's sweep task and stops it when shut down or dropped.
#[derive(Debug)]
#[must_use = "dropping the handle stops the sweep"]
pub struct SweepHandle {
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// Returns true once the sweep task has terminated.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops the sweep and waits for the task to terminate.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}
