// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The rule contract (§4.2): a stable name, a `depends_on` list, and a
//! marshalable body. Each rule is a black box to the engine — the engine is
//! rule-agnostic (§1); this crate only specifies the contract and the
//! machinery to schedule and run it.

use crate::{RuleContext, RuleError};
use async_trait::async_trait;
use serde_json::Value;

/// A correlation rule. Implementors are black boxes; side effects go
/// through [`RuleContext`] and the DB gateway (out of this crate's view —
/// `vigil-engine` wires whatever a concrete rule additionally needs).
#[async_trait]
pub trait Rule: Send + Sync {
    /// Stable name, used for `depends_on` edges and the execution DAG.
    fn name(&self) -> &str;

    /// Names of rules that must complete (successfully or not) before this
    /// one runs (§4.2).
    fn depends_on(&self) -> &[String] {
        &[]
    }

    /// Per Design Note 9(a): the default policy is partial-success — a
    /// failed/timed-out rule's descendants still run with the partial
    /// context. A `mandatory` rule opts out: its failure short-circuits the
    /// rest of the DAG instead of continuing past it.
    fn mandatory(&self) -> bool {
        false
    }

    /// Run the rule body. `payload_xml` is the serialized XML of the
    /// message's payload root element, matching the IPC shape
    /// `(rule_name, message_id, serialized_payload) -> (ok|error, opaque_result)`
    /// (Design Note 9). The result is usually `Value::Null` — side effects
    /// flow through `ctx`.
    async fn run(&self, ctx: &dyn RuleContext, message_id: &str, payload_xml: &str) -> Result<Value, RuleError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use std::time::Duration;

    /// A configurable [`Rule`] for registry/executor/pool tests.
    pub struct FakeRule {
        name: String,
        depends_on: Vec<String>,
        mandatory: bool,
        sleep: Option<Duration>,
        panics: bool,
        result: Value,
    }

    impl FakeRule {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                depends_on: Vec::new(),
                mandatory: false,
                sleep: None,
                panics: false,
                result: Value::Null,
            }
        }

        pub fn depending_on(mut self, names: &[&str]) -> Self {
            self.depends_on = names.iter().map(|s| s.to_string()).collect();
            self
        }

        pub fn mandatory(mut self) -> Self {
            self.mandatory = true;
            self
        }

        pub fn sleeping(mut self, duration: Duration) -> Self {
            self.sleep = Some(duration);
            self
        }

        pub fn panicking(mut self) -> Self {
            self.panics = true;
            self
        }

        pub fn returning(mut self, value: Value) -> Self {
            self.result = value;
            self
        }
    }

    #[async_trait]
    impl Rule for FakeRule {
        fn name(&self) -> &str {
            &self.name
        }

        fn depends_on(&self) -> &[String] {
            &self.depends_on
        }

        fn mandatory(&self) -> bool {
            self.mandatory
        }

        async fn run(&self, ctx: &dyn RuleContext, message_id: &str, _payload_xml: &str) -> Result<Value, RuleError> {
            if let Some(duration) = self.sleep {
                tokio::time::sleep(duration).await;
            }
            if self.panics {
                #[allow(clippy::panic)]
                {
                    panic!("FakeRule {:?} panicking by request", self.name);
                }
            }
            ctx.set(&format!("ran:{}", self.name), Value::from(message_id)).await?;
            Ok(self.result.clone())
        }
    }
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
