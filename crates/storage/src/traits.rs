// SPDX-License-Identifier: MIT

//! The persistence interface shared by both store implementations (§4.1).
//!
//! Both implementations serialize their own operations; callers may call
//! from any thread without external locking. I/O failures surface to the
//! caller, who logs and continues — persistence errors are never fatal
//! (§7): the in-memory dispatch state remains authoritative for the
//! current run even if a write to disk failed.

use crate::error::StorageError;
use crate::statistics::Statistics;
use td_core::{Task, TaskId};

pub trait PersistenceStore: Send + Sync {
    /// Prepare storage for use. Idempotent; safe to call on every startup.
    fn initialize(&self) -> Result<(), StorageError>;

    /// Upsert `task` by id. Atomic with respect to crashes: either the new
    /// record is visible in full afterward, or the previous one is.
    fn save(&self, task: &Task) -> Result<(), StorageError>;

    /// Shorthand upsert of status (and `status_updated_at`) only. The task
    /// must already have a record; this is a refinement of `save`, not a
    /// way to create new records blind.
    fn update_status(&self, task_id: &TaskId, status: td_core::TaskStatus, now_ms: u64) -> Result<(), StorageError>;

    fn delete(&self, task_id: &TaskId) -> Result<(), StorageError>;

    /// All records with status Pending or InProgress, oldest-created first.
    fn load_pending(&self) -> Result<Vec<Task>, StorageError>;

    /// All records with status DeadLetter, ordered by `status_updated_at`.
    fn load_dead_letter(&self) -> Result<Vec<Task>, StorageError>;

    fn statistics(&self) -> Result<Statistics, StorageError>;

    /// Delete Completed/Failed records older than `cutoff_ms`. Returns the
    /// number of records removed.
    fn cleanup_old(&self, cutoff_ms: u64) -> Result<usize, StorageError>;
}
