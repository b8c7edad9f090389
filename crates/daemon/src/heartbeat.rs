// SPDX-License-Identifier: MIT

//! Heartbeat monitor (§4.6): evicts worker handles whose last heartbeat has
//! aged past the timeout. Eviction shares the same cleanup path a read
//! loop's own exit takes, including the retry-on-failure policy.

use crate::context::ServerContext;
use std::sync::Arc;

/// Run one sweep of the registry, disposing of every handle that has gone
/// quiet for longer than `config.heartbeat_timeout`.
pub async fn tick(ctx: &Arc<ServerContext>) {
    let now = ctx.now_ms();
    let timeout_ms = ctx.config.heartbeat_timeout.as_millis() as u64;
    for handle in ctx.registry.snapshot() {
        if !handle.is_alive(timeout_ms, now) {
            tracing::warn!(worker = %handle.id, "heartbeat timeout exceeded, evicting");
            ctx.registry.remove(&handle.id);
            handle.cleanup(ctx).await;
        }
    }
}

/// Background loop: sweep every `config.heartbeat_interval` (§4.6, ≈5 s).
pub async fn run(ctx: Arc<ServerContext>) {
    loop {
        tokio::time::sleep(ctx.config.heartbeat_interval).await;
        tick(&ctx).await;
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
