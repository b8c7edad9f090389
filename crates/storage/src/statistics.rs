// SPDX-License-Identifier: MIT

//! Aggregate task counts, recomputed on demand from the persistence store.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    pub dead_letter: usize,
    pub total: usize,
    pub computed_at_ms: u64,
}

impl Statistics {
    pub fn new(pending: usize, in_progress: usize, completed: usize, failed: usize, dead_letter: usize, now_ms: u64) -> Self {
        Statistics {
            pending,
            in_progress,
            completed,
            failed,
            dead_letter,
            total: pending + in_progress + completed + failed + dead_letter,
            computed_at_ms: now_ms,
        }
    }
}
