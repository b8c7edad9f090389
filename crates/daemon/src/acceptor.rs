// SPDX-License-Identifier: MIT

//! TCP acceptor (§4.8): binds the listening socket, and for every accepted
//! connection mints a worker id, builds a handle, registers it, and spawns
//! its read loop.

use crate::context::ServerContext;
use crate::worker_handle::WorkerHandle;
use std::sync::Arc;
use td_core::WorkerId;
use tokio::net::TcpListener;

pub async fn run(ctx: Arc<ServerContext>) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", ctx.config.bind_port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "acceptor listening");

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed, continuing");
                continue;
            }
        };
        let ctx = ctx.clone();
        tokio::spawn(async move {
            accept_one(socket, peer, ctx).await;
        });
    }
}

async fn accept_one(socket: tokio::net::TcpStream, peer: std::net::SocketAddr, ctx: Arc<ServerContext>) {
    if let Err(e) = socket.set_nodelay(true) {
        tracing::debug!(peer = %peer, error = %e, "failed to set TCP_NODELAY");
    }
    let (read_half, write_half) = socket.into_split();
    let id = WorkerId::new();
    tracing::info!(worker = %id, peer = %peer, "accepted worker connection");
    let handle = WorkerHandle::new(id, write_half, ctx.now_ms());
    ctx.registry.add(handle.clone());
    handle.run_read_loop(read_half, ctx).await;
}
