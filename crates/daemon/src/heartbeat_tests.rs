// SPDX-License-Identifier: MIT

use super::*;
use crate::config::{Cli, Config};
use crate::worker_handle::WorkerHandle;
use td_core::{Task, TaskId, TaskKind, WorkerId};
use td_storage::DocumentStore;
use tempfile::tempdir;
use tokio::net::{TcpListener, TcpStream};

async fn test_ctx() -> (Arc<ServerContext>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let config = Config::from_cli(Cli { file_storage: false, port: 0, data_dir: Some(dir.path().to_path_buf()) });
    let store = Arc::new(DocumentStore::new(config.document_store_path()));
    store.initialize().unwrap();
    (Arc::new(ServerContext::new(config, store)), dir)
}

async fn connected_handle(now_ms: u64) -> (Arc<WorkerHandle>, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
    let client = TcpStream::connect(addr).await.unwrap();
    let server_side = accept.await.unwrap();
    let (_read_half, write_half) = server_side.into_split();
    (WorkerHandle::new(WorkerId::new(), write_half, now_ms), client)
}

#[tokio::test]
async fn stale_worker_is_evicted_and_task_requeued() {
    let dir = tempdir().unwrap();
    let config = Config::from_cli(Cli { file_storage: false, port: 0, data_dir: Some(dir.path().to_path_buf()) });
    let store = Arc::new(DocumentStore::new(config.document_store_path()));
    store.initialize().unwrap();
    let (ctx, fake_clock) = ServerContext::new_with_fake_clock(config, store);
    let ctx = Arc::new(ctx);

    let (handle, _client) = connected_handle(ctx.now_ms()).await;
    let task = Task::new(TaskId::from_counter(1), TaskKind::new(TaskKind::CHECK_PRIME), "7".into(), ctx.now_ms());
    handle.send_task(task, &ctx).await;
    ctx.registry.add(handle);

    // Nothing has pinged since the handle was created; fast-forward well
    // past the heartbeat timeout without sleeping.
    fake_clock.advance(ctx.config.heartbeat_timeout + ctx.config.heartbeat_timeout);

    tick(&ctx).await;

    assert_eq!(ctx.registry.count(), 0);
    assert_eq!(ctx.ready_queue.len(), 1);
    assert_eq!(ctx.ready_queue.peek().unwrap().retry_count, 1);
}

#[tokio::test]
async fn fresh_heartbeat_keeps_worker_registered() {
    let (ctx, _dir) = test_ctx().await;
    let (handle, _client) = connected_handle(ctx.now_ms()).await;
    ctx.registry.add(handle);

    tick(&ctx).await;

    assert_eq!(ctx.registry.count(), 1);
}
