// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! In-process `ContextStore`: a sharded, TTL-expiring map standing in for an
//! out-of-process memcached-class cache (§4.1).

use crate::{ContextError, ContextStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use vigil_core::{Clock, SystemClock};

struct Entry {
    value: Value,
    expires_at: i64,
}

/// Default TTL for per-message keys, in seconds (several minutes, per §4.1).
pub const DEFAULT_MESSAGE_TTL_SECS: i64 = 300;
/// Default TTL for shared keys, in seconds.
pub const DEFAULT_SHARED_TTL_SECS: i64 = 3600;

pub struct InMemoryContextStore<C: Clock = SystemClock> {
    clock: C,
    message_ttl: i64,
    shared_ttl: i64,
    per_id: Mutex<HashMap<String, HashMap<String, Entry>>>,
    shared: Mutex<HashMap<String, Entry>>,
}

impl InMemoryContextStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock, DEFAULT_MESSAGE_TTL_SECS, DEFAULT_SHARED_TTL_SECS)
    }
}

impl Default for InMemoryContextStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryContextStore<C> {
    pub fn with_clock(clock: C, message_ttl: i64, shared_ttl: i64) -> Self {
        Self {
            clock,
            message_ttl,
            shared_ttl,
            per_id: Mutex::new(HashMap::new()),
            shared: Mutex::new(HashMap::new()),
        }
    }

    fn live(&self, entry: &Entry) -> bool {
        entry.expires_at > self.clock.now()
    }
}

#[async_trait]
impl<C: Clock> ContextStore for InMemoryContextStore<C> {
    async fn set(&self, id: &str, key: &str, value: Value) -> Result<(), ContextError> {
        let expires_at = self.clock.now() + self.message_ttl;
        let mut per_id = self.per_id.lock();
        per_id.entry(id.to_string()).or_default().insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn get(&self, id: &str, key: &str) -> Result<Option<Value>, ContextError> {
        let per_id = self.per_id.lock();
        let found = per_id.get(id).and_then(|m| m.get(key)).filter(|e| self.live(e)).map(|e| e.value.clone());
        Ok(found)
    }

    async fn set_shared(&self, key: &str, value: Value) -> Result<(), ContextError> {
        let expires_at = self.clock.now() + self.shared_ttl;
        let mut shared = self.shared.lock();
        shared.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn get_shared(&self, key: &str) -> Result<Option<Value>, ContextError> {
        let shared = self.shared.lock();
        Ok(shared.get(key).filter(|e| self.live(e)).map(|e| e.value.clone()))
    }

    async fn incr_shared(&self, key: &str, delta: i64) -> Result<i64, ContextError> {
        let expires_at = self.clock.now() + self.shared_ttl;
        let mut shared = self.shared.lock();
        let current = shared
            .get(key)
            .filter(|e| self.live(e))
            .map(|e| e.value.as_i64().ok_or(ContextError::Decode { key: key.to_string(), expected: "i64" }))
            .transpose()?
            .unwrap_or(0);
        let next = current + delta;
        shared.insert(key.to_string(), Entry { value: Value::from(next), expires_at });
        Ok(next)
    }

    async fn expire(&self, id: &str) -> Result<(), ContextError> {
        self.per_id.lock().remove(id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
