// SPDX-License-Identifier: MIT

//! Embedded document-style store: a single in-memory map keyed on task id,
//! snapshotted to one JSON file on every mutation.
//!
//! "Secondary indexes on status, created_at, status_updated_at" (§4.1) are
//! realized as sorted scans over the in-memory map rather than separate
//! structures — at the scale this server operates at (one process, one
//! queue) a scan-then-sort is simpler than maintaining three B-trees in
//! lockstep, and it's what the index query methods below actually do.

use crate::atomic::{read_json_or_default, write_atomic};
use crate::error::StorageError;
use crate::statistics::Statistics;
use crate::traits::PersistenceStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use td_core::{Task, TaskId, TaskStatus};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    tasks: HashMap<TaskId, Task>,
}

pub struct DocumentStore {
    path: PathBuf,
    tasks: Mutex<HashMap<TaskId, Task>>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), tasks: Mutex::new(HashMap::new()) }
    }

    fn persist(&self, tasks: &HashMap<TaskId, Task>) -> Result<(), StorageError> {
        let snapshot = Snapshot { tasks: tasks.clone() };
        let bytes = serde_json::to_vec_pretty(&snapshot).unwrap_or_default();
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

impl PersistenceStore for DocumentStore {
    fn initialize(&self) -> Result<(), StorageError> {
        let snapshot: Snapshot = read_json_or_default(&self.path);
        let count = snapshot.tasks.len();
        *self.tasks.lock() = snapshot.tasks;
        tracing::info!(collection = "tasks", records = count, "document store initialized");
        Ok(())
    }

    fn save(&self, task: &Task) -> Result<(), StorageError> {
        let mut tasks = self.tasks.lock();
        tasks.insert(task.id.clone(), task.clone());
        self.persist(&tasks)
    }

    fn update_status(&self, task_id: &TaskId, status: TaskStatus, now_ms: u64) -> Result<(), StorageError> {
        let mut tasks = self.tasks.lock();
        let task = tasks.get_mut(task_id).ok_or_else(|| StorageError::NotFound(task_id.to_string()))?;
        task.status = status;
        task.status_updated_at_ms = now_ms;
        self.persist(&tasks)
    }

    fn delete(&self, task_id: &TaskId) -> Result<(), StorageError> {
        let mut tasks = self.tasks.lock();
        tasks.remove(task_id);
        self.persist(&tasks)
    }

    fn load_pending(&self) -> Result<Vec<Task>, StorageError> {
        let tasks = self.tasks.lock();
        let mut v: Vec<Task> = tasks
            .values()
            .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress))
            .cloned()
            .collect();
        v.sort_by_key(|t| t.created_at_ms);
        Ok(v)
    }

    fn load_dead_letter(&self) -> Result<Vec<Task>, StorageError> {
        let tasks = self.tasks.lock();
        let mut v: Vec<Task> =
            tasks.values().filter(|t| t.status == TaskStatus::DeadLetter).cloned().collect();
        v.sort_by_key(|t| t.status_updated_at_ms);
        Ok(v)
    }

    fn statistics(&self) -> Result<Statistics, StorageError> {
        let tasks = self.tasks.lock();
        let (mut pending, mut in_progress, mut completed, mut failed, mut dead_letter) = (0, 0, 0, 0, 0);
        for t in tasks.values() {
            match t.status {
                TaskStatus::Pending => pending += 1,
                TaskStatus::InProgress => in_progress += 1,
                TaskStatus::Completed => completed += 1,
                TaskStatus::Failed => failed += 1,
                TaskStatus::DeadLetter => dead_letter += 1,
            }
        }
        Ok(Statistics::new(pending, in_progress, completed, failed, dead_letter, 0))
    }

    fn cleanup_old(&self, cutoff_ms: u64) -> Result<usize, StorageError> {
        let mut tasks = self.tasks.lock();
        let to_remove: Vec<TaskId> = tasks
            .values()
            .filter(|t| t.status.is_terminal() && t.status_updated_at_ms < cutoff_ms)
            .map(|t| t.id.clone())
            .collect();
        for id in &to_remove {
            tasks.remove(id);
        }
        if !to_remove.is_empty() {
            self.persist(&tasks)?;
        }
        Ok(to_remove.len())
    }
}

#[cfg(test)]
#[path = "document_store_tests.rs"]
mod tests;
