// SPDX-License-Identifier: MIT

//! Daemon configuration: CLI flags plus the fixed defaults from §4-§6 of
//! the design (retry ceiling, heartbeat timeout, monitor cadences).

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Default TCP port the acceptor listens on (§6).
pub const DEFAULT_PORT: u16 = 12345;

#[derive(Debug, Parser)]
#[command(name = "taskd", about = "Distributed task-dispatch server")]
pub struct Cli {
    /// Use the append-rewrite JSON file store instead of the embedded
    /// document store.
    #[arg(long)]
    pub file_storage: bool,

    /// TCP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory holding persisted task state and the dead-letter audit
    /// log. Defaults to the platform state directory.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_port: u16,
    pub file_storage: bool,
    pub data_dir: PathBuf,
    pub max_retries: u32,
    pub heartbeat_timeout: Duration,
    pub heartbeat_interval: Duration,
    pub dispatch_interval: Duration,
    pub dead_letter_interval: Duration,
    pub cleanup_interval: Duration,
    pub retention: Duration,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
        Config {
            bind_port: cli.port,
            file_storage: cli.file_storage,
            data_dir,
            max_retries: td_core::DEFAULT_MAX_RETRIES,
            heartbeat_timeout: Duration::from_secs(30),
            heartbeat_interval: Duration::from_secs(5),
            dispatch_interval: Duration::from_millis(100),
            dead_letter_interval: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(3600),
            retention: Duration::from_secs(7 * 24 * 3600),
        }
    }

    pub fn document_store_path(&self) -> PathBuf {
        self.data_dir.join("tasks.json")
    }

    pub fn dead_letter_log_path(&self) -> PathBuf {
        self.data_dir.join("dead-letter-queue.log")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("taskd")
}
