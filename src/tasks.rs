//! In-memory registry of concurrent episode runs.
//!
//! Each run gets a UUID key and its own [`ProgressTracker`]; nothing is
//! shared between runs. Embedders poll `status()` from any thread. An
//! abandoned run is removed and its resources dropped.

use crate::progress::{ProgressTracker, RunStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Thread-safe map of run IDs to their progress trackers.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<Mutex<HashMap<Uuid, ProgressTracker>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new run, returning its ID and tracker handle.
    pub fn register(&self) -> (Uuid, ProgressTracker) {
        let id = Uuid::new_v4();
        let tracker = ProgressTracker::new();
        self.lock().insert(id, tracker.clone());
        (id, tracker)
    }

    /// Snapshot a run's status, if it exists.
    pub fn status(&self, id: &Uuid) -> Option<RunStatus> {
        self.lock().get(id).map(|t| t.snapshot())
    }

    /// Remove a run. Returns true if it was registered.
    pub fn remove(&self, id: &Uuid) -> bool {
        self.lock().remove(id).is_some()
    }

    /// IDs of all registered runs.
    pub fn ids(&self) -> Vec<Uuid> {
        self.lock().keys().copied().collect()
    }

    /// Number of registered runs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no runs are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, ProgressTracker>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
