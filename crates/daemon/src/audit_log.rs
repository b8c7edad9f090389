// SPDX-License-Identifier: MIT

//! Append-only, line-based, human-readable record of every task that was
//! dead-lettered (§4.4, §6). Best-effort: a failure to write is logged and
//! swallowed, same as any other persistence error (§7) — it must never
//! take down the retry path that called it.

use chrono::{TimeZone, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use td_core::Task;

fn fmt_ms(ms: u64) -> String {
    Utc.timestamp_millis_opt(ms as i64).single().map(|t| t.to_rfc3339()).unwrap_or_else(|| ms.to_string())
}

pub fn append(path: &Path, task: &Task, worker_id: &str, now_ms: u64) {
    let line = format!(
        "{} task={} kind={} payload={:?} retry_count={} created_at={} last_retry_at={} worker={}\n",
        fmt_ms(now_ms),
        task.id,
        task.kind,
        task.payload,
        task.retry_count,
        fmt_ms(task.created_at_ms),
        task.last_retry_at_ms.map(fmt_ms).unwrap_or_else(|| "-".to_string()),
        worker_id,
    );

    let result = (|| -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())
    })();

    if let Err(e) = result {
        tracing::warn!(path = %path.display(), error = %e, "failed to append dead-letter audit log line");
    }
}

#[cfg(test)]
#[path = "audit_log_tests.rs"]
mod tests;
