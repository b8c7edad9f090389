// SPDX-License-Identifier: MIT

//! The dispatch loop (§4.5): pairs the head of the ready queue with an idle,
//! capable worker and hands it off. Runs until the process shuts down; the
//! caller spawns [`run`] as its own task.

use crate::context::ServerContext;
use std::sync::Arc;

/// Run one dispatcher iteration: at most one dispatch or one dead-letter
/// drain. Split out from [`run`] so tests can drive single ticks
/// deterministically instead of racing a sleep loop.
pub async fn tick(ctx: &Arc<ServerContext>) {
    let Some(head) = ctx.ready_queue.peek() else {
        return;
    };

    let idle_capable = ctx.registry.snapshot().into_iter().find(|w| w.is_idle() && w.can_handle(&head.kind));

    if let Some(handle) = idle_capable {
        let Some(task) = ctx.ready_queue.pop_if_head_is(&head.id) else {
            // Queue moved under us between peek and pop; resume next tick.
            return;
        };
        tracing::debug!(task = %task.id, worker = %handle.id, "dispatching task");
        handle.send_task(task, ctx).await;
        return;
    }

    let unroutable = ctx.registry.snapshot().iter().all(|w| !w.can_handle(&head.kind));
    if unroutable {
        if let Some(mut task) = ctx.ready_queue.pop_if_head_is(&head.id) {
            let now = ctx.now_ms();
            task.mark_unroutable(now);
            if let Err(e) = ctx.persistence.save(&task) {
                tracing::warn!(task = %task.id, error = %e, "persistence error while dead-lettering unroutable task");
            }
            tracing::warn!(task = %task.id, kind = %task.kind, "no registered worker claims this kind, dead-lettering");
            ctx.dead_letter_queue.push(task);
        }
    }
}

/// Background loop: tick, then sleep ≈100 ms (§4.5 step 5).
pub async fn run(ctx: Arc<ServerContext>) {
    loop {
        tick(&ctx).await;
        tokio::time::sleep(ctx.config.dispatch_interval).await;
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
