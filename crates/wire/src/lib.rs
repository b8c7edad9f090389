// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! td-wire: the framed JSON message codec spoken between the dispatch
//! daemon and worker connections.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{decode, encode, MAX_FRAME_BYTES};
pub use error::WireError;
pub use message::Message;
