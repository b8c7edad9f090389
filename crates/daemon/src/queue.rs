// SPDX-License-Identifier: MIT

//! Thread-safe FIFO used for both the ready queue and the dead-letter
//! queue (§4.3). Non-blocking enqueue/dequeue, insertion order, no
//! priorities.

use parking_lot::Mutex;
use std::collections::VecDeque;
use td_core::{Task, TaskId};

#[derive(Default)]
pub struct TaskQueue {
    items: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self { items: Mutex::new(VecDeque::new()) }
    }

    pub fn push(&self, task: Task) {
        self.items.lock().push_back(task);
    }

    /// Clone of the head, without removing it.
    pub fn peek(&self) -> Option<Task> {
        self.items.lock().front().cloned()
    }

    /// Remove and return the head, but only if it is still `expected_id` —
    /// guards against the dispatcher acting on a queue that moved under it
    /// between `peek` and `pop` (§4.5 step 3).
    pub fn pop_if_head_is(&self, expected_id: &TaskId) -> Option<Task> {
        let mut items = self.items.lock();
        if items.front().is_some_and(|t| &t.id == expected_id) {
            items.pop_front()
        } else {
            None
        }
    }

    /// Drain every item, in FIFO order, removing them from the queue.
    pub fn drain_all(&self) -> Vec<Task> {
        self.items.lock().drain(..).collect()
    }

    /// Scan for and remove a task by id regardless of position. Used only
    /// for the rare stray-result race (§4.4, Open Questions): a `Result`
    /// that arrives for a task already requeued under it.
    pub fn remove_by_id(&self, id: &TaskId) -> Option<Task> {
        let mut items = self.items.lock();
        let pos = items.iter().position(|t| &t.id == id)?;
        items.remove(pos)
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
