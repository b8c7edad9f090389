// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! td-daemon: the distributed task-dispatch server. A TCP acceptor hands
//! each connection to a [`worker_handle::WorkerHandle`]; a dispatcher loop
//! pulls from the ready queue and assigns to idle, capable workers; a
//! heartbeat monitor evicts unresponsive connections; dead-letter and
//! cleanup monitors sweep persistence on their own cadences. See
//! `main.rs` for how these are wired together at startup.

pub mod acceptor;
pub mod audit_log;
pub mod config;
pub mod console;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod heartbeat;
pub mod monitors;
pub mod queue;
pub mod registry;
pub mod worker_handle;

pub use config::{Cli, Config};
pub use context::ServerContext;
pub use error::DaemonError;
