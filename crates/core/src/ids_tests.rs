// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn task_id_round_trips_counter() {
    let id = TaskId::from_counter(42);
    assert_eq!(id.as_str(), "Task-42");
    assert_eq!(id.counter(), Some(42));
}

#[test]
fn task_id_counter_none_for_foreign_ids() {
    let id = TaskId::from_string("legacy-id");
    assert_eq!(id.counter(), None);
}

#[test]
fn worker_ids_are_unique() {
    let a = WorkerId::new();
    let b = WorkerId::new();
    assert_ne!(a, b);
}
