// SPDX-License-Identifier: MIT

//! The server context: the small bag of shared, concurrency-safe state
//! threaded through every background activity (acceptor, dispatcher,
//! heartbeat monitor, dead-letter/cleanup monitors, console). No ambient
//! singletons — everything is reached through an `Arc<ServerContext>`
//! (design note in §9).

use crate::audit_log;
use crate::config::Config;
use crate::queue::TaskQueue;
use crate::registry::WorkerRegistry;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use td_core::{Clock, FakeClock, SystemClock, TaskId};
use td_storage::PersistenceStore;

/// Either the real wall clock or, in tests, a clock an observer can
/// fast-forward without sleeping (grounded on [`td_core::clock`]).
#[derive(Clone)]
pub enum ServerClock {
    System(SystemClock),
    Fake(FakeClock),
}

impl Clock for ServerClock {
    fn epoch_ms(&self) -> u64 {
        match self {
            ServerClock::System(c) => c.epoch_ms(),
            ServerClock::Fake(c) => c.epoch_ms(),
        }
    }
}

pub struct ServerContext {
    pub config: Config,
    pub persistence: Arc<dyn PersistenceStore>,
    pub registry: WorkerRegistry,
    pub ready_queue: TaskQueue,
    pub dead_letter_queue: TaskQueue,
    pub clock: ServerClock,
    pub server_id: String,
    next_task_counter: AtomicU64,
    dead_letter_log_path: PathBuf,
}

impl ServerContext {
    pub fn new(config: Config, persistence: Arc<dyn PersistenceStore>) -> Self {
        let dead_letter_log_path = config.dead_letter_log_path();
        ServerContext {
            config,
            persistence,
            registry: WorkerRegistry::new(),
            ready_queue: TaskQueue::new(),
            dead_letter_queue: TaskQueue::new(),
            clock: ServerClock::System(SystemClock),
            server_id: format!("server-{}", nanoid::nanoid!(8)),
            next_task_counter: AtomicU64::new(0),
            dead_letter_log_path,
        }
    }

    /// Test-only constructor that swaps in a [`FakeClock`] so heartbeat and
    /// retention tests can jump time forward instead of sleeping.
    #[cfg(test)]
    pub fn new_with_fake_clock(config: Config, persistence: Arc<dyn PersistenceStore>) -> (Self, FakeClock) {
        let fake = FakeClock::new();
        let mut ctx = Self::new(config, persistence);
        ctx.clock = ServerClock::Fake(fake.clone());
        (ctx, fake)
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    /// Mint the next task id, in the form `Task-<n>`.
    pub fn next_task_id(&self) -> TaskId {
        let n = self.next_task_counter.fetch_add(1, Ordering::SeqCst);
        TaskId::from_counter(n)
    }

    /// Fast-forward the counter so it is strictly greater than every
    /// persisted `Task-<n>` id, per the restart-recovery invariant (§8).
    pub fn observe_persisted_id(&self, id: &TaskId) {
        if let Some(n) = id.counter() {
            self.next_task_counter.fetch_max(n + 1, Ordering::SeqCst);
        }
    }

    pub fn append_dead_letter_audit_log(&self, task: &td_core::Task, worker_id: &str) {
        audit_log::append(&self.dead_letter_log_path, task, worker_id, self.now_ms());
    }
}
