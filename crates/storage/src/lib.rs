// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! DB Gateway (§4.4): the trait boundary between the async pipeline and the
//! relational store, plus the operations the State/History Writer (§4.5)
//! and Correvent Manager (§4.6) drive through it.

mod error;
mod gateway;
mod memory;
mod outcome;
#[cfg(feature = "postgres")]
mod pg;

pub use error::DbError;
pub use gateway::StorageGateway;
pub use memory::InMemoryStorageGateway;
pub use outcome::{HistoryOutcome, StateOutcome};
#[cfg(feature = "postgres")]
pub use pg::PgGateway;
