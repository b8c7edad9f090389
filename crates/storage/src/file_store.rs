// SPDX-License-Identifier: MIT

//! Append-rewrite file store: three JSON files partitioned by status
//! bucket (`tasks_pending.json`, `tasks_completed.json`,
//! `tasks_deadletter.json`), each holding a JSON array of records. A
//! mutation rewrites every file whose bucket membership could have
//! changed — simplest correct behavior when a task can migrate buckets
//! (e.g. InProgress -> DeadLetter) on any given call.

use crate::atomic::{read_json_or_default, write_atomic};
use crate::error::StorageError;
use crate::statistics::Statistics;
use crate::traits::PersistenceStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use td_core::{Task, TaskId, TaskStatus};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Pending,
    Completed,
    DeadLetter,
}

fn bucket_of(status: TaskStatus) -> Bucket {
    match status {
        TaskStatus::Pending | TaskStatus::InProgress => Bucket::Pending,
        TaskStatus::Completed | TaskStatus::Failed => Bucket::Completed,
        TaskStatus::DeadLetter => Bucket::DeadLetter,
    }
}

pub struct FileStore {
    dir: PathBuf,
    tasks: Mutex<HashMap<TaskId, Task>>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), tasks: Mutex::new(HashMap::new()) }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn load_bucket(path: &Path) -> HashMap<TaskId, Task> {
        let list: Vec<Task> = read_json_or_default(path);
        list.into_iter().map(|t| (t.id.clone(), t)).collect()
    }

    fn persist(&self, tasks: &HashMap<TaskId, Task>) -> Result<(), StorageError> {
        let mut pending = Vec::new();
        let mut completed = Vec::new();
        let mut dead_letter = Vec::new();
        for task in tasks.values() {
            match bucket_of(task.status) {
                Bucket::Pending => pending.push(task.clone()),
                Bucket::Completed => completed.push(task.clone()),
                Bucket::DeadLetter => dead_letter.push(task.clone()),
            }
        }
        pending.sort_by_key(|t| t.created_at_ms);
        dead_letter.sort_by_key(|t| t.status_updated_at_ms);

        write_atomic(&self.path("tasks_pending.json"), &serde_json::to_vec_pretty(&pending).unwrap_or_default())?;
        write_atomic(&self.path("tasks_completed.json"), &serde_json::to_vec_pretty(&completed).unwrap_or_default())?;
        write_atomic(&self.path("tasks_deadletter.json"), &serde_json::to_vec_pretty(&dead_letter).unwrap_or_default())?;
        Ok(())
    }

    fn write_statistics(&self, stats: &Statistics) {
        if let Ok(bytes) = serde_json::to_vec_pretty(stats) {
            let _ = write_atomic(&self.path("statistics.json"), &bytes);
        }
    }
}

impl PersistenceStore for FileStore {
    fn initialize(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tasks = Self::load_bucket(&self.path("tasks_pending.json"));
        tasks.extend(Self::load_bucket(&self.path("tasks_completed.json")));
        tasks.extend(Self::load_bucket(&self.path("tasks_deadletter.json")));
        let count = tasks.len();
        *self.tasks.lock() = tasks;
        tracing::info!(variant = "file", records = count, "file store initialized");
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
        let stats = Statistics::new(pending, in_progress, completed, failed, dead_letter, 0);
        self.write_statistics(&stats);
        Ok(stats)
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
#[path = "file_store_tests.rs"]
mod tests;
