// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Errors surfaced by the Executor, Ingestor, and Correvent Manager (§7).
//! Wraps the per-crate errors of the layers the engine drives so the
//! Dispatcher can classify anything the pipeline raises without matching on
//! crate-specific variants.

use vigil_context::ContextError;
use vigil_core::{Classify, ErrorClass};
use vigil_rules::RuleError;
use vigil_storage::DbError;
use vigil_wire::WireError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error(transparent)]
    Wire(#[from] WireError),
    /// The message's `id` attribute is missing, or its root element is
    /// recognized but malformed beyond what `vigil-wire` already rejects
    /// (§4.5 step 1: "if missing, drop with an error log").
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    /// A `ComputationOrder` arrived but no HLS-dependency rule is
    /// registered (§4.5): "require that a specific HLS-dependency rule is
    /// registered". Permanent: the order is dropped and logged rather than
    /// retried, since registering the rule fixes every future occurrence.
    #[error("no HLS-dependency rule registered to handle computation orders")]
    HlsRuleNotRegistered,
}

impl Classify for EngineError {
    fn class(&self) -> ErrorClass {
        match self {
            EngineError::Context(e) => e.class(),
            EngineError::Db(e) => e.class(),
            EngineError::Rule(e) => e.class(),
            EngineError::Wire(e) => e.class(),
            EngineError::InvalidMessage(_) | EngineError::HlsRuleNotRegistered => {
                ErrorClass::Permanent
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
