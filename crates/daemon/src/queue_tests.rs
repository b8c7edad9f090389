// SPDX-License-Identifier: MIT

use super::*;
use td_core::TaskKind;

fn task(n: u64) -> Task {
    Task::new(TaskId::from_counter(n), TaskKind::new(TaskKind::CHECK_PRIME), "7".into(), n)
}

#[test]
fn fifo_order_preserved() {
    let q = TaskQueue::new();
    q.push(task(0));
    q.push(task(1));
    q.push(task(2));
    assert_eq!(q.peek().unwrap().id, TaskId::from_counter(0));
    let popped = q.pop_if_head_is(&TaskId::from_counter(0)).unwrap();
    assert_eq!(popped.id, TaskId::from_counter(0));
    assert_eq!(q.len(), 2);
}

#[test]
fn pop_if_head_is_rejects_stale_expectation() {
    let q = TaskQueue::new();
    q.push(task(0));
    assert!(q.pop_if_head_is(&TaskId::from_counter(99)).is_none());
    assert_eq!(q.len(), 1);
}

#[test]
fn drain_all_empties_the_queue() {
    let q = TaskQueue::new();
    q.push(task(0));
    q.push(task(1));
    let drained = q.drain_all();
    assert_eq!(drained.len(), 2);
    assert!(q.is_empty());
}

#[test]
fn remove_by_id_finds_any_position() {
    let q = TaskQueue::new();
    q.push(task(0));
    q.push(task(1));
    q.push(task(2));
    let removed = q.remove_by_id(&TaskId::from_counter(1)).unwrap();
    assert_eq!(removed.id, TaskId::from_counter(1));
    assert_eq!(q.len(), 2);
    assert!(q.remove_by_id(&TaskId::from_counter(99)).is_none());
}
