// SPDX-License-Identifier: MIT

//! The domain-level message enum spoken between server and worker.
//!
//! The wire shape (see [`crate::codec`]) is an intentionally loose JSON
//! envelope inherited from the original protocol; this module is what the
//! rest of the daemon actually matches on.

use td_core::{TaskId, TaskKind};

/// A single decoded frame, already validated and stripped of its envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// server -> worker: here is a task to run.
    Task {
        task_id: TaskId,
        kind: TaskKind,
        data: String,
        retry_count: u32,
        created_at_ms: u64,
        last_retry_at_ms: Option<u64>,
    },
    /// worker -> server: a task finished, successfully or not.
    Result { task_id: TaskId, success: bool, result_data: Option<String> },
    /// worker -> server: liveness ping.
    PingRequest { client_id: String },
    /// server -> worker: liveness ack.
    PingResponse { server_id: String },
    /// worker -> server: initial handshake declaring capabilities.
    Register { client_id: String, client_name: Option<String>, capabilities: Vec<String>, version: Option<String> },
    /// server -> worker: handshake ack.
    RegisterResponse { success: bool, message: String, server_id: String, accepted_capabilities: Vec<String> },
}

impl Message {
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::Task { .. } => "Task",
            Message::Result { .. } => "Result",
            Message::PingRequest { .. } => "PingRequest",
            Message::PingResponse { .. } => "PingResponse",
            Message::Register { .. } => "Register",
            Message::RegisterResponse { .. } => "RegisterResponse",
        }
    }
}
