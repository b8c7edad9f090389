// SPDX-License-Identifier: MIT

//! Framed JSON codec.
//!
//! Each frame is a single JSON object written in one socket write and read
//! back in one `read()` call against a fixed-size buffer — there is no
//! length-prefix or newline delimiter. This is a known limitation inherited
//! from the original protocol (§4.2, Open Questions): messages larger than
//! [`MAX_FRAME_BYTES`] are not supported. A length-prefixed successor is the
//! obvious next step if this protocol is ever revised, but that is out of
//! scope here.

use crate::error::WireError;
use crate::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Size of the read buffer each worker connection uses per frame.
pub const MAX_FRAME_BYTES: usize = 4096;

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireTask {
    #[serde(rename = "TaskId")]
    task_id: String,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Data")]
    data: String,
    #[serde(rename = "RetryCount", default)]
    retry_count: u32,
    #[serde(rename = "CreatedAt", default)]
    created_at: u64,
    #[serde(rename = "LastRetryAt", default)]
    last_retry_at: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireResult {
    #[serde(rename = "TaskId")]
    task_id: String,
    #[serde(rename = "Success", default)]
    success: bool,
    #[serde(rename = "ResultData", default)]
    result_data: Option<String>,
}

/// Loosely-typed envelope mirroring the wire shape: every message-specific
/// field is optional, and which ones are populated is decided by `Type`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Timestamp", default)]
    timestamp: u64,
    #[serde(rename = "Task", default, skip_serializing_if = "Option::is_none")]
    task: Option<WireTask>,
    #[serde(rename = "Result", default, skip_serializing_if = "Option::is_none")]
    result: Option<WireResult>,
    #[serde(rename = "ClientId", default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(rename = "ServerId", default, skip_serializing_if = "Option::is_none")]
    server_id: Option<String>,
    #[serde(rename = "ClientName", default, skip_serializing_if = "Option::is_none")]
    client_name: Option<String>,
    #[serde(rename = "Capabilities", default, skip_serializing_if = "Option::is_none")]
    capabilities: Option<Vec<String>>,
    #[serde(rename = "Version", default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(rename = "Success", default, skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    #[serde(rename = "Message", default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(rename = "AcceptedCapabilities", default, skip_serializing_if = "Option::is_none")]
    accepted_capabilities: Option<Vec<String>>,
}

/// Encode a message into a single JSON frame. `now_ms` stamps `Timestamp`.
pub fn encode(message: &Message, now_ms: u64) -> Vec<u8> {
    let envelope = match message.clone() {
        Message::Task { task_id, kind, data, retry_count, created_at_ms, last_retry_at_ms } => {
            Envelope {
                kind: "Task".to_string(),
                timestamp: now_ms,
                task: Some(WireTask {
                    task_id: task_id.to_string(),
                    kind: kind.to_string(),
                    data,
                    retry_count,
                    created_at: created_at_ms,
                    last_retry_at: last_retry_at_ms,
                }),
                ..Default::default()
            }
        }
        Message::Result { task_id, success, result_data } => Envelope {
            kind: "Result".to_string(),
            timestamp: now_ms,
            result: Some(WireResult { task_id: task_id.to_string(), success, result_data }),
            ..Default::default()
        },
        Message::PingRequest { client_id } => {
            Envelope { kind: "PingRequest".to_string(), timestamp: now_ms, client_id: Some(client_id), ..Default::default() }
        }
        Message::PingResponse { server_id } => {
            Envelope { kind: "PingResponse".to_string(), timestamp: now_ms, server_id: Some(server_id), ..Default::default() }
        }
        Message::Register { client_id, client_name, capabilities, version } => Envelope {
            kind: "Register".to_string(),
            timestamp: now_ms,
            client_id: Some(client_id),
            client_name,
            capabilities: Some(capabilities),
            version,
            ..Default::default()
        },
        Message::RegisterResponse { success, message, server_id, accepted_capabilities } => Envelope {
            kind: "RegisterResponse".to_string(),
            timestamp: now_ms,
            success: Some(success),
            message: Some(message),
            server_id: Some(server_id),
            accepted_capabilities: Some(accepted_capabilities),
            ..Default::default()
        },
    };
    // An envelope round-trips through a Rust struct; serialization cannot
    // fail short of an allocator error, which we let propagate as a panic
    // the same as the rest of the standard library would.
    serde_json::to_vec(&envelope).unwrap_or_else(|_| b"{}".to_vec())
}

fn envelope_to_message(env: Envelope) -> Result<Message, WireError> {
    match env.kind.as_str() {
        "Task" => {
            let t = env.task.ok_or(WireError::MissingField("Task", "Task"))?;
            Ok(Message::Task {
                task_id: t.task_id.into(),
                kind: t.kind.into(),
                data: t.data,
                retry_count: t.retry_count,
                created_at_ms: t.created_at,
                last_retry_at_ms: t.last_retry_at,
            })
        }
        "Result" => {
            let r = env.result.ok_or(WireError::MissingField("Result", "Result"))?;
            Ok(Message::Result { task_id: r.task_id.into(), success: r.success, result_data: r.result_data })
        }
        "PingRequest" => {
            let client_id = env.client_id.ok_or(WireError::MissingField("PingRequest", "ClientId"))?;
            Ok(Message::PingRequest { client_id })
        }
        "PingResponse" => {
            let server_id = env.server_id.ok_or(WireError::MissingField("PingResponse", "ServerId"))?;
            Ok(Message::PingResponse { server_id })
        }
        "Register" => {
            let client_id = env.client_id.ok_or(WireError::MissingField("Register", "ClientId"))?;
            Ok(Message::Register {
                client_id,
                client_name: env.client_name,
                capabilities: env.capabilities.unwrap_or_default(),
                version: env.version,
            })
        }
        "RegisterResponse" => {
            let server_id = env.server_id.ok_or(WireError::MissingField("RegisterResponse", "ServerId"))?;
            Ok(Message::RegisterResponse {
                success: env.success.unwrap_or(false),
                message: env.message.unwrap_or_default(),
                server_id,
                accepted_capabilities: env.accepted_capabilities.unwrap_or_default(),
            })
        }
        other => Err(WireError::UnknownType(other.to_string())),
    }
}

/// Attempt the legacy fallback parse: a frame with no `Type` discriminator
/// that nonetheless looks like a bare `Result` (has a non-empty `TaskId`
/// and a `Success` field) or a bare `Task` (has `TaskId`, `Type`, `Data`).
fn legacy_fallback(value: &Value) -> Option<Message> {
    let obj = value.as_object()?;
    if let Some(task_id) = obj.get("TaskId").and_then(Value::as_str) {
        if task_id.is_empty() {
            return None;
        }
        if let Some(success) = obj.get("Success").and_then(Value::as_bool) {
            let result_data = obj.get("ResultData").and_then(Value::as_str).map(str::to_string);
            return Some(Message::Result { task_id: task_id.into(), success, result_data });
        }
        if let (Some(kind), Some(data)) =
            (obj.get("Type").and_then(Value::as_str), obj.get("Data").and_then(Value::as_str))
        {
            let retry_count = obj.get("RetryCount").and_then(Value::as_u64).unwrap_or(0) as u32;
            let created_at = obj.get("CreatedAt").and_then(Value::as_u64).unwrap_or(0);
            let last_retry_at = obj.get("LastRetryAt").and_then(Value::as_u64);
            return Some(Message::Task {
                task_id: task_id.into(),
                kind: kind.into(),
                data: data.to_string(),
                retry_count,
                created_at_ms: created_at,
                last_retry_at_ms: last_retry_at,
            });
        }
    }
    None
}

/// Decode a single frame. Both the typed envelope and the legacy bare
/// `Task`/`Result` shapes are accepted; anything else is a [`WireError`]
/// the caller should log and drop without closing the connection.
pub fn decode(bytes: &[u8]) -> Result<Message, WireError> {
    let value: Value = serde_json::from_slice(bytes)?;
    if value.get("Type").and_then(Value::as_str).is_some() {
        let env: Envelope = serde_json::from_value(value)?;
        return envelope_to_message(env);
    }
    legacy_fallback(&value).ok_or(WireError::Unrecognized)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
