// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Adapts the real [`ContextStore`] to the minimal [`RuleContext`] surface
//! a rule body sees (§4.1, §4.2), scoped to one message id so
//! `vigil-rules` doesn't need to know about message ids at all.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use vigil_context::ContextStore;
use vigil_rules::{RuleContext, RuleError};

fn to_rule_error(err: vigil_context::ContextError) -> RuleError {
    RuleError::ContextUnavailable(err.to_string())
}

pub struct ScopedRuleContext {
    store: Arc<dyn ContextStore>,
    message_id: String,
}

impl ScopedRuleContext {
    pub fn new(store: Arc<dyn ContextStore>, message_id: impl Into<String>) -> Self {
        Self { store, message_id: message_id.into() }
    }
}

#[async_trait]
impl RuleContext for ScopedRuleContext {
    async fn get(&self, key: &str) -> Result<Option<Value>, RuleError> {
        self.store.get(&self.message_id, key).await.map_err(to_rule_error)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), RuleError> {
        self.store.set(&self.message_id, key, value).await.map_err(to_rule_error)
    }

    async fn get_shared(&self, key: &str) -> Result<Option<Value>, RuleError> {
        self.store.get_shared(key).await.map_err(to_rule_error)
    }

    async fn set_shared(&self, key: &str, value: Value) -> Result<(), RuleError> {
        self.store.set_shared(key, value).await.map_err(to_rule_error)
    }

    async fn incr_shared(&self, key: &str, delta: i64) -> Result<i64, RuleError> {
        self.store.incr_shared(key, delta).await.map_err(to_rule_error)
    }
}

#[cfg(test)]
#[path = "context_adapter_tests.rs"]
mod tests;
