// SPDX-License-Identifier: MIT

use super::*;

fn task() -> Task {
    Task::new(TaskId::from_counter(0), TaskKind::new(TaskKind::CHECK_PRIME), "7".into(), 100)
}

#[test]
fn new_task_is_pending() {
    let t = task();
    assert_eq!(t.status, TaskStatus::Pending);
    assert_eq!(t.retry_count, 0);
    assert!(t.client_id.is_none());
}

#[test]
fn retry_requeues_below_max() {
    let mut t = task();
    let dead = t.retry_or_dead_letter(3, 200);
    assert!(!dead);
    assert_eq!(t.status, TaskStatus::Pending);
    assert_eq!(t.retry_count, 1);
    assert_eq!(t.last_retry_at_ms, Some(200));
}

#[test]
fn retry_dead_letters_at_max() {
    let mut t = task();
    t.retry_or_dead_letter(3, 100);
    t.retry_or_dead_letter(3, 200);
    let dead = t.retry_or_dead_letter(3, 300);
    assert!(dead);
    assert_eq!(t.status, TaskStatus::DeadLetter);
    assert_eq!(t.retry_count, 3);
}

#[test]
fn retry_count_never_decreases_across_requeue() {
    let mut t = task();
    t.retry_or_dead_letter(3, 100);
    t.retry_or_dead_letter(3, 200);
    assert_eq!(t.retry_count, 2);
    t.requeue_from_dead_letter(300);
    assert_eq!(t.retry_count, 0);
    assert_eq!(t.status, TaskStatus::Pending);
}

#[test]
fn unroutable_goes_straight_to_dead_letter_without_consuming_retry() {
    let mut t = task();
    t.mark_unroutable(100);
    assert_eq!(t.status, TaskStatus::DeadLetter);
    assert_eq!(t.retry_count, 0);
}

#[test]
fn completed_and_failed_are_terminal() {
    assert!(TaskStatus::Completed.is_terminal());
    assert!(TaskStatus::Failed.is_terminal());
    assert!(!TaskStatus::Pending.is_terminal());
    assert!(!TaskStatus::DeadLetter.is_terminal());
}
