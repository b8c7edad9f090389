// SPDX-License-Identifier: MIT

//! Opaque identifiers for tasks and worker connections.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Prefix for [`TaskId`] values, matched by [`TaskId::counter`] on recovery.
pub const TASK_ID_PREFIX: &str = "Task-";

/// Stable task identifier assigned at submission time.
///
/// Always of the form `Task-<n>` where `n` is a monotonically increasing
/// counter. The counter is what lets the acceptor recompute the next free id
/// from whatever was last persisted (§4.8 of the design).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(SmolStr);

impl TaskId {
    /// Construct the id for counter value `n`.
    pub fn from_counter(n: u64) -> Self {
        Self(SmolStr::new(format!("{TASK_ID_PREFIX}{n}")))
    }

    /// Wrap an externally supplied string (e.g. loaded from persistence).
    pub fn from_string(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Extract the numeric counter, if this id follows the `Task-<n>` shape.
    pub fn counter(&self) -> Option<u64> {
        self.0.strip_prefix(TASK_ID_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Server-assigned identifier for a live worker connection.
///
/// Minted fresh by the acceptor for every accepted socket; never persisted
/// and never reused once the handle is disposed. A worker's self-reported
/// `ClientId` (from `Register`/`PingRequest`) is recorded for diagnostics but
/// this id remains authoritative (§6).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(SmolStr);

impl WorkerId {
    /// Mint a fresh, random worker id.
    pub fn new() -> Self {
        Self(SmolStr::new(format!("worker-{}", nanoid::nanoid!(12))))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WorkerId {
    fn from(s: String) -> Self {
        Self(SmolStr::new(s))
    }
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
