// SPDX-License-Identifier: MIT

use super::*;
use crate::config::{Cli, Config};
use std::sync::Arc;
use td_core::TaskId;
use td_storage::DocumentStore;
use tempfile::tempdir;
use tokio::net::{TcpListener, TcpStream};

async fn loopback_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connect = TcpStream::connect(addr);
    let (server_side, _) = tokio::join!(listener.accept(), connect);
    let (accepted, _) = server_side.unwrap();
    let client_side = TcpStream::connect(addr).await.unwrap();
    (accepted, client_side)
}

fn test_ctx() -> (Arc<ServerContext>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let mut config = Config::from_cli(Cli { file_storage: false, port: 0, data_dir: Some(dir.path().to_path_buf()) });
    config.max_retries = 3;
    let store = Arc::new(DocumentStore::new(config.document_store_path()));
    store.initialize().unwrap();
    (Arc::new(ServerContext::new(config, store)), dir)
}

#[tokio::test]
async fn send_task_marks_busy_and_persists_in_progress() {
    let (ctx, _dir) = test_ctx();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
    let client = TcpStream::connect(addr).await.unwrap();
    let server_side = accept.await.unwrap();
    let (_read_half, write_half) = server_side.into_split();
    drop(client);

    let handle = WorkerHandle::new(WorkerId::new(), write_half, ctx.now_ms());
    let task = Task::new(TaskId::from_counter(1), TaskKind::new(TaskKind::CHECK_PRIME), "7".into(), ctx.now_ms());
    handle.send_task(task, &ctx).await;

    assert!(!handle.is_idle());
    let pending = ctx.persistence.load_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, td_core::TaskStatus::InProgress);
}

#[tokio::test]
async fn result_for_in_flight_task_marks_idle_and_completed() {
    let (ctx, _dir) = test_ctx();
    let (server_side, client_side) = loopback_pair().await;
    let (read_half, write_half) = server_side.into_split();

    let handle = WorkerHandle::new(WorkerId::new(), write_half, ctx.now_ms());
    let task = Task::new(TaskId::from_counter(5), TaskKind::new(TaskKind::CHECK_PRIME), "7".into(), ctx.now_ms());
    handle.send_task(task, &ctx).await;

    let handle_for_loop = handle.clone();
    let ctx_for_loop = ctx.clone();
    let loop_task = tokio::spawn(async move {
        handle_for_loop.run_read_loop(read_half, ctx_for_loop).await;
    });

    let result_frame = td_wire::encode(
        &Message::Result { task_id: TaskId::from_counter(5), success: true, result_data: Some("true".into()) },
        ctx.now_ms(),
    );
    use tokio::io::AsyncWriteExt;
    let mut client_side = client_side;
    client_side.write_all(&result_frame).await.unwrap();
    // Closing triggers EOF on the server side so the read loop exits cleanly.
    drop(client_side);
    loop_task.await.unwrap();

    assert!(handle.is_idle());
    let pending = ctx.persistence.load_pending().unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn connection_drop_requeues_in_flight_task() {
    let (ctx, _dir) = test_ctx();
    let (server_side, client_side) = loopback_pair().await;
    let (read_half, write_half) = server_side.into_split();

    let handle = WorkerHandle::new(WorkerId::new(), write_half, ctx.now_ms());
    let task = Task::new(TaskId::from_counter(9), TaskKind::new(TaskKind::CHECK_PRIME), "7".into(), ctx.now_ms());
    handle.send_task(task, &ctx).await;

    let ctx_for_loop = ctx.clone();
    let loop_task = tokio::spawn(async move {
        handle.run_read_loop(read_half, ctx_for_loop).await;
    });
    drop(client_side);
    loop_task.await.unwrap();

    assert_eq!(ctx.ready_queue.len(), 1);
    let requeued = ctx.ready_queue.peek().unwrap();
    assert_eq!(requeued.id, TaskId::from_counter(9));
    assert_eq!(requeued.retry_count, 1);
}

#[tokio::test]
async fn exhausting_retries_dead_letters_instead_of_requeuing() {
    let (ctx, _dir) = test_ctx();

    for attempt in 0..ctx.config.max_retries {
        let (server_side, client_side) = loopback_pair().await;
        let (read_half, write_half) = server_side.into_split();
        let handle = WorkerHandle::new(WorkerId::new(), write_half, ctx.now_ms());
        let task = ctx.ready_queue.remove_by_id(&TaskId::from_counter(3)).unwrap_or_else(|| {
            Task::new(TaskId::from_counter(3), TaskKind::new(TaskKind::CHECK_PRIME), "7".into(), ctx.now_ms())
        });
        handle.send_task(task, &ctx).await;
        let ctx_for_loop = ctx.clone();
        let loop_task = tokio::spawn(async move {
            handle.run_read_loop(read_half, ctx_for_loop).await;
        });
        drop(client_side);
        loop_task.await.unwrap();
        let _ = attempt;
    }

    assert!(ctx.ready_queue.is_empty());
    assert_eq!(ctx.dead_letter_queue.len(), 1);
    let dead = ctx.dead_letter_queue.peek().unwrap();
    assert_eq!(dead.retry_count, ctx.config.max_retries);
}

#[test]
fn can_handle_defaults_open_until_registered() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let (ctx, _dir) = test_ctx();
        let (server_side, _client_side) = loopback_pair().await;
        let (_read_half, write_half) = server_side.into_split();
        let handle = WorkerHandle::new(WorkerId::new(), write_half, ctx.now_ms());
        assert!(handle.can_handle(&TaskKind::new(TaskKind::HASH_TEXT)));
    });
}
