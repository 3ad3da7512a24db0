// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The scratchpad handle a rule body sees (§4.1, §4.2). Rules communicate
//! exclusively through named keys, never through shared closures (Design
//! Note 9): this trait is the minimal surface a rule needs, already scoped
//! to one message id, so `vigil-rules` doesn't have to depend on
//! `vigil-context`'s backend. `vigil-engine` hands rules an adapter over the
//! real [`ContextStore`](vigil_context::ContextStore).

use crate::RuleError;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait RuleContext: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, RuleError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), RuleError>;
    async fn get_shared(&self, key: &str) -> Result<Option<Value>, RuleError>;
    async fn set_shared(&self, key: &str, value: Value) -> Result<(), RuleError>;
    async fn incr_shared(&self, key: &str, delta: i64) -> Result<i64, RuleError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// An in-memory [`RuleContext`] for rule unit tests, with no TTL
    /// semantics (it is not a stand-in for the real Context Store — see
    /// `vigil-context`'s own in-memory implementation for that).
    #[derive(Default)]
    pub struct FakeRuleContext {
        per_id: Mutex<HashMap<String, Value>>,
        shared: Mutex<HashMap<String, Value>>,
    }

    impl FakeRuleContext {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, key: &str, value: Value) {
            self.per_id.lock().insert(key.to_string(), value);
        }

        pub fn seed_shared(&self, key: &str, value: Value) {
            self.shared.lock().insert(key.to_string(), value);
        }
    }

    #[async_trait]
    impl RuleContext for FakeRuleContext {
        async fn get(&self, key: &str) -> Result<Option<Value>, RuleError> {
            Ok(self.per_id.lock().get(key).cloned())
        }

        async fn set(&self, key: &str, value: Value) -> Result<(), RuleError> {
            self.per_id.lock().insert(key.to_string(), value);
            Ok(())
        }

        async fn get_shared(&self, key: &str) -> Result<Option<Value>, RuleError> {
            Ok(self.shared.lock().get(key).cloned())
        }

        async fn set_shared(&self, key: &str, value: Value) -> Result<(), RuleError> {
            self.shared.lock().insert(key.to_string(), value);
            Ok(())
        }

        async fn incr_shared(&self, key: &str, delta: i64) -> Result<i64, RuleError> {
            let mut shared = self.shared.lock();
            let current = shared.get(key).and_then(|v| v.as_i64()).unwrap_or(0);
            let next = current + delta;
            shared.insert(key.to_string(), Value::from(next));
            Ok(next)
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
