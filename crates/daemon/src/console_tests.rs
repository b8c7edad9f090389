// SPDX-License-Identifier: MIT

use super::*;
use crate::config::{Cli, Config};
use td_core::TaskStatus;
use td_storage::DocumentStore;
use tempfile::tempdir;

fn test_ctx() -> (Arc<ServerContext>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let config = Config::from_cli(Cli { file_storage: false, port: 0, data_dir: Some(dir.path().to_path_buf()) });
    let store = Arc::new(DocumentStore::new(config.document_store_path()));
    store.initialize().unwrap();
    (Arc::new(ServerContext::new(config, store)), dir)
}

#[test]
fn create_enqueues_a_pending_task() {
    let (ctx, _dir) = test_ctx();
    assert_eq!(handle_line("create CheckPrime 7", &ctx), Outcome::Continue);
    assert_eq!(ctx.ready_queue.len(), 1);
    assert_eq!(ctx.ready_queue.peek().unwrap().payload, "7");
}

#[test]
fn create_batch_enqueues_n_tasks() {
    let (ctx, _dir) = test_ctx();
    handle_line("create batch CheckPrime 5", &ctx);
    assert_eq!(ctx.ready_queue.len(), 5);
}

#[test]
fn reprocess_deadletter_resets_retry_count_and_moves_to_ready() {
    let (ctx, _dir) = test_ctx();
    let mut task =
        td_core::Task::new(td_core::TaskId::from_counter(0), TaskKind::new(TaskKind::CHECK_PRIME), "7".into(), 0);
    task.retry_count = 3;
    task.status = TaskStatus::DeadLetter;
    ctx.dead_letter_queue.push(task);

    handle_line("reprocess-deadletter", &ctx);

    assert!(ctx.dead_letter_queue.is_empty());
    assert_eq!(ctx.ready_queue.len(), 1);
    let requeued = ctx.ready_queue.peek().unwrap();
    assert_eq!(requeued.retry_count, 0);
    assert_eq!(requeued.status, TaskStatus::Pending);
}

#[test]
fn clear_deadletter_drops_without_requeuing() {
    let (ctx, _dir) = test_ctx();
    let task = td_core::Task::new(td_core::TaskId::from_counter(1), TaskKind::new(TaskKind::CHECK_PRIME), "7".into(), 0);
    ctx.dead_letter_queue.push(task);

    handle_line("clear-deadletter", &ctx);

    assert!(ctx.dead_letter_queue.is_empty());
    assert!(ctx.ready_queue.is_empty());
}

#[test]
fn exit_is_recognized() {
    let (ctx, _dir) = test_ctx();
    assert_eq!(handle_line("exit", &ctx), Outcome::Exit);
}

#[test]
fn unknown_command_does_not_panic() {
    let (ctx, _dir) = test_ctx();
    assert_eq!(handle_line("bogus", &ctx), Outcome::Continue);
}
