// SPDX-License-Identifier: MIT

//! Binary entry point: parse CLI flags, stand up the chosen persistence
//! backend, replay durable state into the in-memory queues (§4.8), then
//! spawn every background activity plus the acceptor and operator console.

use clap::Parser;
use std::sync::Arc;
use td_daemon::config::{Cli, Config};
use td_daemon::context::ServerContext;
use td_daemon::{acceptor, console, dispatcher, heartbeat, monitors};
use td_storage::{DocumentStore, FileStore, PersistenceStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = Config::from_cli(cli);

    let persistence: Arc<dyn PersistenceStore> = if config.file_storage {
        Arc::new(FileStore::new(config.data_dir.clone()))
    } else {
        Arc::new(DocumentStore::new(config.document_store_path()))
    };
    if let Err(e) = persistence.initialize() {
        tracing::error!(error = %e, "failed to initialize persistence store, starting with empty state");
    }

    let ctx = Arc::new(ServerContext::new(config, persistence));
    recover(&ctx);

    tokio::spawn(dispatcher::run(ctx.clone()));
    tokio::spawn(heartbeat::run(ctx.clone()));
    tokio::spawn(monitors::run_dead_letter_monitor(ctx.clone()));
    tokio::spawn(monitors::run_cleanup_monitor(ctx.clone()));
    let acceptor_ctx = ctx.clone();
    tokio::spawn(async move {
        if let Err(e) = acceptor::run(acceptor_ctx).await {
            tracing::error!(error = %e, "acceptor terminated unexpectedly");
        }
    });

    console::run(ctx).await;
}

/// Startup recovery (§4.8): load persisted Pending/InProgress tasks into the
/// ready queue (InProgress is intentionally re-interpreted as Pending — see
/// design notes), load persisted DeadLetter tasks into the dead-letter
/// queue, and fast-forward the task-id counter past every id seen.
fn recover(ctx: &ServerContext) {
    match ctx.persistence.load_pending() {
        Ok(tasks) => {
            let count = tasks.len();
            for task in tasks {
                ctx.observe_persisted_id(&task.id);
                ctx.ready_queue.push(task);
            }
            tracing::info!(count, "recovered pending tasks into ready queue");
        }
        Err(e) => tracing::warn!(error = %e, "failed to load pending tasks on startup"),
    }

    match ctx.persistence.load_dead_letter() {
        Ok(tasks) => {
            let count = tasks.len();
            for task in tasks {
                ctx.observe_persisted_id(&task.id);
                ctx.dead_letter_queue.push(task);
            }
            tracing::info!(count, "recovered dead-letter tasks");
        }
        Err(e) => tracing::warn!(error = %e, "failed to load dead-letter tasks on startup"),
    }
}
