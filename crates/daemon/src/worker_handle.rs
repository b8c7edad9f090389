// SPDX-License-Identifier: MIT

//! The per-connection actor: one [`WorkerHandle`] per accepted socket (§4,
//! Worker handle). Owns the write half, tracks liveness and the in-flight
//! task, and runs the read loop that turns frames into state transitions.
//!
//! The read loop and the heartbeat monitor are the two paths that can end a
//! connection's life; both funnel through [`WorkerHandle::cleanup`], guarded
//! by `disposed` so the retry-on-failure policy runs exactly once no matter
//! which side notices first.

use crate::context::ServerContext;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use td_core::{Task, TaskId, TaskKind, WorkerId};
use td_wire::{Message, MAX_FRAME_BYTES};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Idle,
    Busy,
}

/// Point-in-time snapshot for diagnostics (console `clients`, §4.9).
#[derive(Debug, Clone)]
pub struct WorkerInfo {
    pub id: WorkerId,
    pub name: Option<String>,
    pub status: WorkerStatus,
    pub capabilities: Option<Vec<String>>,
    pub in_flight_task_id: Option<TaskId>,
    pub last_heartbeat_at_ms: u64,
}

pub struct WorkerHandle {
    pub id: WorkerId,
    write_half: tokio::sync::Mutex<OwnedWriteHalf>,
    status: Mutex<WorkerStatus>,
    last_heartbeat_at_ms: AtomicU64,
    in_flight: Mutex<Option<Task>>,
    /// `None` until a `Register` frame declares capabilities; a worker that
    /// never registers is treated as able to run anything (legacy clients,
    /// §4.2).
    capabilities: Mutex<Option<HashSet<TaskKind>>>,
    name: Mutex<Option<String>>,
    reported_client_id: Mutex<Option<String>>,
    disposed: AtomicBool,
}

impl WorkerHandle {
    pub fn new(id: WorkerId, write_half: OwnedWriteHalf, now_ms: u64) -> Arc<Self> {
        Arc::new(WorkerHandle {
            id,
            write_half: tokio::sync::Mutex::new(write_half),
            status: Mutex::new(WorkerStatus::Idle),
            last_heartbeat_at_ms: AtomicU64::new(now_ms),
            in_flight: Mutex::new(None),
            capabilities: Mutex::new(None),
            name: Mutex::new(None),
            reported_client_id: Mutex::new(None),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn is_idle(&self) -> bool {
        *self.status.lock() == WorkerStatus::Idle
    }

    fn set_status(&self, status: WorkerStatus) {
        *self.status.lock() = status;
    }

    /// Alive iff a heartbeat (or any inbound frame, which refreshes the same
    /// clock) has been seen within `timeout_ms` (§4.6).
    pub fn is_alive(&self, timeout_ms: u64, now_ms: u64) -> bool {
        let last = self.last_heartbeat_at_ms.load(Ordering::SeqCst);
        now_ms.saturating_sub(last) < timeout_ms
    }

    /// A worker with no declared capabilities accepts anything (legacy
    /// behavior); otherwise the kind must be in its declared set.
    pub fn can_handle(&self, kind: &TaskKind) -> bool {
        match self.capabilities.lock().as_ref() {
            None => true,
            Some(caps) => caps.contains(kind),
        }
    }

    pub fn info(&self) -> WorkerInfo {
        WorkerInfo {
            id: self.id.clone(),
            name: self.name.lock().clone(),
            status: *self.status.lock(),
            capabilities: self
                .capabilities
                .lock()
                .as_ref()
                .map(|set| set.iter().map(|k| k.as_str().to_string()).collect()),
            in_flight_task_id: self.in_flight.lock().as_ref().map(|t| t.id.clone()),
            last_heartbeat_at_ms: self.last_heartbeat_at_ms.load(Ordering::SeqCst),
        }
    }

    async fn send_frame(&self, msg: &Message, now_ms: u64) -> std::io::Result<()> {
        let bytes = td_wire::encode(msg, now_ms);
        let mut w = self.write_half.lock().await;
        w.write_all(&bytes).await
    }

    /// Hand `task` to this worker: flips it Busy, persists `InProgress`,
    /// records it as in-flight, and writes the frame. A write failure runs
    /// the same retry-on-failure policy as a dead connection (§4.4).
    pub async fn send_task(self: &Arc<Self>, task: Task, ctx: &Arc<ServerContext>) {
        let now = ctx.now_ms();
        self.set_status(WorkerStatus::Busy);
        let mut assigned = task;
        assigned.mark_in_progress(self.id.clone(), now);
        if let Err(e) = ctx.persistence.save(&assigned) {
            tracing::warn!(worker = %self.id, error = %e, "persistence error while saving in-progress task");
        }
        *self.in_flight.lock() = Some(assigned.clone());

        let msg = Message::Task {
            task_id: assigned.id.clone(),
            kind: assigned.kind.clone(),
            data: assigned.payload.clone(),
            retry_count: assigned.retry_count,
            created_at_ms: assigned.created_at_ms,
            last_retry_at_ms: assigned.last_retry_at_ms,
        };
        if let Err(e) = self.send_frame(&msg, now).await {
            tracing::warn!(worker = %self.id, task = %assigned.id, error = %e, "failed to write task frame, disposing worker");
            self.cleanup(ctx).await;
            ctx.registry.remove(&self.id);
        }
    }

    /// Run the read loop until EOF or an I/O error, dispatching each decoded
    /// frame. Returns once the connection is done for; the caller is
    /// responsible for dropping it from the registry.
    pub async fn run_read_loop(self: Arc<Self>, mut read_half: OwnedReadHalf, ctx: Arc<ServerContext>) {
        let mut buf = vec![0u8; MAX_FRAME_BYTES];
        loop {
            let n = match read_half.read(&mut buf).await {
                Ok(0) => {
                    tracing::info!(worker = %self.id, "worker closed connection");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(worker = %self.id, error = %e, "read error, closing worker connection");
                    break;
                }
            };
            match td_wire::decode(&buf[..n]) {
                Ok(msg) => self.handle_message(msg, &ctx).await,
                Err(e) => {
                    tracing::warn!(worker = %self.id, error = %e, "dropping unparseable frame");
                }
            }
        }
        self.cleanup(&ctx).await;
        ctx.registry.remove(&self.id);
    }

    async fn handle_message(self: &Arc<Self>, msg: Message, ctx: &Arc<ServerContext>) {
        self.last_heartbeat_at_ms.store(ctx.now_ms(), Ordering::SeqCst);
        match msg {
            Message::Result { task_id, success, result_data } => {
                self.handle_result(task_id, success, result_data, ctx).await;
            }
            Message::PingRequest { client_id } => {
                *self.reported_client_id.lock() = Some(client_id);
                let resp = Message::PingResponse { server_id: ctx.server_id.clone() };
                if let Err(e) = self.send_frame(&resp, ctx.now_ms()).await {
                    tracing::warn!(worker = %self.id, error = %e, "failed to write ping response");
                }
            }
            Message::Register { client_id, client_name, capabilities, version: _ } => {
                *self.reported_client_id.lock() = Some(client_id);
                *self.name.lock() = client_name;
                let caps: HashSet<TaskKind> = capabilities.iter().map(|s| TaskKind::new(s.as_str())).collect();
                let accepted: Vec<String> = caps.iter().map(|k| k.as_str().to_string()).collect();
                *self.capabilities.lock() = Some(caps);
                let resp = Message::RegisterResponse {
                    success: true,
                    message: "registered".to_string(),
                    server_id: ctx.server_id.clone(),
                    accepted_capabilities: accepted,
                };
                if let Err(e) = self.send_frame(&resp, ctx.now_ms()).await {
                    tracing::warn!(worker = %self.id, error = %e, "failed to write register response");
                }
            }
            Message::Task { .. } | Message::PingResponse { .. } | Message::RegisterResponse { .. } => {
                tracing::warn!(worker = %self.id, kind = msg.type_name(), "unexpected message from worker, dropping");
            }
        }
    }

    async fn handle_result(self: &Arc<Self>, task_id: TaskId, success: bool, result_data: Option<String>, ctx: &Arc<ServerContext>) {
        let now = ctx.now_ms();
        let matched = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.as_ref() {
                Some(t) if t.id == task_id => in_flight.take(),
                _ => None,
            }
        };
        let Some(mut task) = matched else {
            // Stray result: the worker's own idea of what it's running no
            // longer matches the server's (race with a heartbeat eviction or
            // a prior timeout). Finalize it directly if it's still sitting
            // in the ready queue waiting for a fresh attempt; otherwise there
            // is nothing left to correct (§4.4, Open Questions).
            self.finalize_stray_result(&task_id, success, result_data, ctx, now);
            return;
        };
        self.set_status(WorkerStatus::Idle);
        if success {
            task.mark_completed(now);
        } else {
            task.mark_failed(result_data, now);
        }
        if let Err(e) = ctx.persistence.save(&task) {
            tracing::warn!(worker = %self.id, task = %task.id, error = %e, "persistence error while saving result");
        }
    }

    fn finalize_stray_result(&self, task_id: &TaskId, success: bool, result_data: Option<String>, ctx: &ServerContext, now: u64) {
        let Some(mut task) = ctx.ready_queue.remove_by_id(task_id) else {
            tracing::warn!(worker = %self.id, task = %task_id, "result for unknown or already-finalized task, dropping");
            return;
        };
        if success {
            task.mark_completed(now);
        } else {
            task.mark_failed(result_data, now);
        }
        if let Err(e) = ctx.persistence.save(&task) {
            tracing::warn!(worker = %self.id, task = %task.id, error = %e, "persistence error while saving stray result");
        }
        tracing::info!(worker = %self.id, task = %task.id, "late result accepted for already-requeued task, removed from ready queue");
    }

    /// Apply the retry-on-worker-failure policy to whatever task is
    /// currently in flight, if any. The in-flight slot stays populated
    /// through persistence and re-enqueue and is only cleared at the end, so
    /// there is never a window where the task exists in neither place.
    fn apply_retry_policy(&self, ctx: &ServerContext) {
        let mut guard = self.in_flight.lock();
        if let Some(task) = guard.as_mut() {
            let now = ctx.now_ms();
            let dead = task.retry_or_dead_letter(ctx.config.max_retries, now);
            if let Err(e) = ctx.persistence.save(task) {
                tracing::warn!(worker = %self.id, task = %task.id, error = %e, "persistence error while saving retried task");
            }
            if dead {
                ctx.dead_letter_queue.push(task.clone());
                ctx.append_dead_letter_audit_log(task, self.id.as_str());
                tracing::warn!(worker = %self.id, task = %task.id, "task exceeded max retries, moved to dead letter");
            } else {
                ctx.ready_queue.push(task.clone());
                tracing::info!(worker = %self.id, task = %task.id, retry_count = task.retry_count, "task requeued after worker failure");
            }
        }
        *guard = None;
    }

    /// Idempotent teardown: runs the retry policy and shuts down the socket
    /// exactly once, however many of (read-loop exit, heartbeat eviction,
    /// write failure) end up calling it concurrently.
    pub async fn cleanup(&self, ctx: &ServerContext) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.apply_retry_policy(ctx);
        let mut w = self.write_half.lock().await;
        let _ = w.shutdown().await;
    }
}

#[cfg(test)]
#[path = "worker_handle_tests.rs"]
mod tests;
