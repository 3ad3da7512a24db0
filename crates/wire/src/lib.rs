// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! XML bus framing (§6): inbound item decoding into the core [`Message`]
//! shape (Design Note 9's tagged-variant `Payload`), and outbound encoding
//! of state republication and correvent notifications (§4.7).

mod decode;
mod encode;
mod error;

pub use decode::decode_item;
pub use encode::{encode_correvent_notification, encode_state_update, CorreventNotification, StateUpdate};
pub use error::WireError;
