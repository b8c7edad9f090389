// SPDX-License-Identifier: MIT

//! The task data model: kinds, statuses, and the task record itself.

use crate::ids::{TaskId, WorkerId};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Default retry ceiling; a task that fails this many times on worker death
/// is moved to the dead-letter queue instead of being requeued.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// A capability tag identifying what kind of work a task represents.
///
/// The set is open: the two kinds the reference workers understand
/// (`CheckPrime`, `HashText`) are provided as constants, but any string a
/// worker declares in its `Register` capabilities is a valid kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskKind(SmolStr);

impl TaskKind {
    pub const CHECK_PRIME: &'static str = "CheckPrime";
    pub const HASH_TEXT: &'static str = "HashText";

    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskKind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKind {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Lifecycle status of a task. See the state machine in §4.9 of the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    DeadLetter,
}

impl TaskStatus {
    /// Completed and Failed are terminal except for retention-driven deletion.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Failed => "Failed",
            TaskStatus::DeadLetter => "DeadLetter",
        };
        write!(f, "{s}")
    }
}

/// A unit of work flowing through the dispatch engine.
///
/// Invariants enforced by the methods below rather than by construction:
/// `retry_count` never decreases, `status_updated_at` is bumped on every
/// transition, and `client_id` is cleared whenever the task leaves
/// `InProgress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub payload: String,
    pub retry_count: u32,
    pub created_at_ms: u64,
    pub last_retry_at_ms: Option<u64>,
    pub status: TaskStatus,
    pub status_updated_at_ms: u64,
    pub client_id: Option<WorkerId>,
    pub error_message: Option<String>,
}

impl Task {
    pub fn new(id: TaskId, kind: TaskKind, payload: String, now_ms: u64) -> Self {
        Task {
            id,
            kind,
            payload,
            retry_count: 0,
            created_at_ms: now_ms,
            last_retry_at_ms: None,
            status: TaskStatus::Pending,
            status_updated_at_ms: now_ms,
            client_id: None,
            error_message: None,
        }
    }

    /// Transition to `InProgress` and assign the owning worker.
    pub fn mark_in_progress(&mut self, worker_id: WorkerId, now_ms: u64) {
        self.status = TaskStatus::InProgress;
        self.client_id = Some(worker_id);
        self.status_updated_at_ms = now_ms;
    }

    pub fn mark_completed(&mut self, now_ms: u64) {
        self.status = TaskStatus::Completed;
        self.client_id = None;
        self.error_message = None;
        self.status_updated_at_ms = now_ms;
    }

    pub fn mark_failed(&mut self, error: Option<String>, now_ms: u64) {
        self.status = TaskStatus::Failed;
        self.client_id = None;
        self.error_message = error;
        self.status_updated_at_ms = now_ms;
    }

    /// Apply the retry-on-worker-failure policy: bump the retry count and
    /// either return the task to `Pending` (caller re-enqueues) or move it
    /// to `DeadLetter` (caller pushes to the dead-letter queue).
    ///
    /// Returns `true` if the task is now dead-lettered.
    pub fn retry_or_dead_letter(&mut self, max_retries: u32, now_ms: u64) -> bool {
        self.retry_count += 1;
        self.last_retry_at_ms = Some(now_ms);
        self.client_id = None;
        if self.retry_count < max_retries {
            self.status = TaskStatus::Pending;
            self.status_updated_at_ms = now_ms;
            false
        } else {
            self.status = TaskStatus::DeadLetter;
            self.status_updated_at_ms = now_ms;
            true
        }
    }

    /// Force straight to `DeadLetter` without consuming a retry, used when a
    /// task's kind is unroutable (no registered worker claims it).
    pub fn mark_unroutable(&mut self, now_ms: u64) {
        self.client_id = None;
        self.status = TaskStatus::DeadLetter;
        self.status_updated_at_ms = now_ms;
    }

    /// Operator requeue: exit `DeadLetter` back to `Pending`, resetting the
    /// retry count (the only path back out of a terminal dead-letter).
    pub fn requeue_from_dead_letter(&mut self, now_ms: u64) {
        self.retry_count = 0;
        self.last_retry_at_ms = None;
        self.status = TaskStatus::Pending;
        self.status_updated_at_ms = now_ms;
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
