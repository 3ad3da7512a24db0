// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The Dispatcher (§4.7) and the process wiring that turns a
//! [`vigil_engine::Engine`], a [`vigil_adapters::BusAdapter`], and a
//! [`vigil_storage::StorageGateway`] into the long-running `vigild` daemon.

mod dispatcher;
mod error;
mod wiring;

pub use dispatcher::{DispatchStats, Dispatcher};
pub use error::DispatchError;
pub use wiring::{exit_code_for, run, RunDeps, RunError};
