// SPDX-License-Identifier: MIT

//! The two low-frequency background sweeps (§4.7): a dead-letter monitor
//! that reports size deltas and periodic statistics, and a persistence
//! cleanup monitor that deletes terminal records past the retention window.

use crate::context::ServerContext;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Background loop: every `config.dead_letter_interval` (≈30 s), log the
/// change in dead-letter queue depth since the last tick and emit
/// aggregate statistics.
pub async fn run_dead_letter_monitor(ctx: Arc<ServerContext>) {
    let last_seen = AtomicUsize::new(ctx.dead_letter_queue.len());
    loop {
        tokio::time::sleep(ctx.config.dead_letter_interval).await;
        let current = ctx.dead_letter_queue.len();
        let previous = last_seen.swap(current, Ordering::SeqCst);
        if current != previous {
            tracing::info!(previous, current, delta = current as i64 - previous as i64, "dead-letter queue size changed");
        }
        report_statistics(&ctx, "dead-letter-monitor");
    }
}

/// Background loop: every `config.cleanup_interval` (≈1 h), delete
/// Completed/Failed records older than `config.retention` and report how
/// many were removed.
pub async fn run_cleanup_monitor(ctx: Arc<ServerContext>) {
    loop {
        tokio::time::sleep(ctx.config.cleanup_interval).await;
        let cutoff = ctx.now_ms().saturating_sub(ctx.config.retention.as_millis() as u64);
        match ctx.persistence.cleanup_old(cutoff) {
            Ok(removed) => tracing::info!(removed, "persistence cleanup removed retention-expired records"),
            Err(e) => tracing::warn!(error = %e, "persistence cleanup failed"),
        }
        report_statistics(&ctx, "cleanup-monitor");
    }
}

fn report_statistics(ctx: &ServerContext, source: &str) {
    match ctx.persistence.statistics() {
        Ok(stats) => tracing::info!(
            source,
            pending = stats.pending,
            in_progress = stats.in_progress,
            completed = stats.completed,
            failed = stats.failed,
            dead_letter = stats.dead_letter,
            idle_workers = ctx.registry.snapshot().iter().filter(|w| w.is_idle()).count(),
            busy_workers = ctx.registry.snapshot().iter().filter(|w| !w.is_idle()).count(),
            "statistics"
        ),
        Err(e) => tracing::warn!(source, error = %e, "failed to read statistics"),
    }
}

#[cfg(test)]
#[path = "monitors_tests.rs"]
mod tests;
