// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use vigil_core::{Classify, ErrorClass};

/// Errors surfaced by a rule invocation or its runner pool (§4.2, §4.3, §7).
#[derive(Debug, thiserror::Error, Clone)]
pub enum RuleError {
    /// The worker was killed after exceeding `rules_timeout` (§4.3).
    #[error("rule {rule:?} timed out")]
    Timeout { rule: String },
    /// The rule body panicked or otherwise crashed its worker (§4.3). Any
    /// unhandled exception from a rule is treated as this (§7).
    #[error("rule {rule:?} crashed: {detail}")]
    Crashed { rule: String, detail: String },
    /// The pool is stopped (bus disconnected); dispatch is refused and the
    /// Dispatcher should treat this as retryable (§4.3).
    #[error("rule runner pool is stopped")]
    PoolStopped,
    /// The rule's context handle hit a transient backend error while the
    /// rule body was running.
    #[error("context unavailable: {0}")]
    ContextUnavailable(String),
}

impl Classify for RuleError {
    fn class(&self) -> ErrorClass {
        match self {
            RuleError::Timeout { .. } | RuleError::Crashed { .. } => ErrorClass::RuleFailure,
            RuleError::PoolStopped | RuleError::ContextUnavailable(_) => ErrorClass::Transient,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
