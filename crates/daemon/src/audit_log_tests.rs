// SPDX-License-Identifier: MIT

use super::*;
use tempfile::tempdir;
use td_core::{TaskId, TaskKind};

#[test]
fn append_writes_one_line_per_call() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dead-letter-queue.log");
    let mut t = Task::new(TaskId::from_counter(2), TaskKind::new(TaskKind::CHECK_PRIME), "9".into(), 1_000);
    t.retry_count = 3;
    append(&path, &t, "worker-abc", 2_000);
    append(&path, &t, "worker-abc", 3_000);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
    assert!(contents.contains("Task-2"));
    assert!(contents.contains("worker-abc"));
}
