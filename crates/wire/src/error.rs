// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from decoding a wire frame. Every variant is recoverable: the
/// caller logs and drops the offending frame, it never closes the
/// connection (§4.2, §7).
#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unrecognized frame: no Type discriminator and not a legacy Task/Result")]
    Unrecognized,

    #[error("message of type {0:?} is missing required field {1:?}")]
    MissingField(&'static str, &'static str),

    #[error("unknown Type discriminator: {0:?}")]
    UnknownType(String),
}
