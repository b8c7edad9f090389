// SPDX-License-Identifier: MIT

//! Concurrent map from worker id to worker handle (§4, Worker registry).
//!
//! Iteration hands back a snapshot `Vec`, which is explicitly allowed by
//! §5: callers (the dispatcher, the heartbeat monitor, the console) must
//! tolerate entries that have since disappeared.

use crate::worker_handle::WorkerHandle;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use td_core::WorkerId;

#[derive(Default)]
pub struct WorkerRegistry {
    workers: RwLock<HashMap<WorkerId, Arc<WorkerHandle>>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handle: Arc<WorkerHandle>) {
        self.workers.write().insert(handle.id.clone(), handle);
    }

    pub fn remove(&self, id: &WorkerId) -> Option<Arc<WorkerHandle>> {
        self.workers.write().remove(id)
    }

    pub fn get(&self, id: &WorkerId) -> Option<Arc<WorkerHandle>> {
        self.workers.read().get(id).cloned()
    }

    pub fn snapshot(&self) -> Vec<Arc<WorkerHandle>> {
        self.workers.read().values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.workers.read().len()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
