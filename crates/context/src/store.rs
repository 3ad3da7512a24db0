// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Per-message scratchpad with shared, TTL-expiring counters (§4.1).

use crate::ContextError;
use async_trait::async_trait;
use serde_json::Value;

/// A keyed store scoped per message id, plus a shared scope keyed
/// independently of any message (§3, Context).
///
/// The shipped implementation ([`crate::InMemoryContextStore`]) is an
/// in-process stand-in; a production deployment swaps in a client for an
/// out-of-process cache behind this same trait.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Store a value under `key`, scoped to `id`. Expires after the
    /// configured per-message TTL.
    async fn set(&self, id: &str, key: &str, value: Value) -> Result<(), ContextError>;

    /// Fetch a value scoped to `id`. A missing or expired key yields `None`.
    async fn get(&self, id: &str, key: &str) -> Result<Option<Value>, ContextError>;

    /// Store a value under `key` in the shared (cross-message) scope.
    async fn set_shared(&self, key: &str, value: Value) -> Result<(), ContextError>;

    /// Fetch a value from the shared scope. A missing or expired key yields
    /// `None`.
    async fn get_shared(&self, key: &str) -> Result<Option<Value>, ContextError>;

    /// Atomically add `delta` to the shared counter at `key`, creating it at
    /// `0` if absent, and return the new value.
    async fn incr_shared(&self, key: &str, delta: i64) -> Result<i64, ContextError>;

    /// Drop all per-id keys for `id` (pipeline completion or timeout).
    async fn expire(&self, id: &str) -> Result<(), ContextError>;
}
