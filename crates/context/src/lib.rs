// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The Context Store (§4.1): a per-message scratchpad with shared,
//! TTL-expiring counters.

mod error;
mod memory;
mod store;

pub use error::ContextError;
pub use memory::{InMemoryContextStore, DEFAULT_MESSAGE_TTL_SECS, DEFAULT_SHARED_TTL_SECS};
pub use store::ContextStore;
