// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Cross-cutting error taxonomy (§7).
//!
//! Each crate defines its own `thiserror`-derived error enum at its
//! boundary (`ContextError`, `DbError`, `RuleError`, ...); every one of them
//! implements [`Classify`] so the Dispatcher can decide what to do with any
//! error it receives without matching on crate-specific variants.

use serde::{Deserialize, Serialize};

/// How the Dispatcher should react to an error surfacing from the pipeline
/// (§7, propagation policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// `TransientBus` / `TransientContext` / `TransientDB`: reinsert the
    /// original raw message at the tail of the retry queue; log at INFO.
    Transient,
    /// `RuleTimeout` / `RuleCrashed`: log at ERROR, the DAG continues with
    /// the partial context produced so far.
    RuleFailure,
    /// `InvalidMessage`: drop the message; log at ERROR. The pipeline ends
    /// successfully (message acknowledged) to avoid poison-message loops.
    Permanent,
    /// `DBFatal` during the startup probe: terminate the process.
    Fatal,
}

impl ErrorClass {
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorClass::Transient)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorClass::Fatal)
    }
}

/// Implemented by every crate-local error enum so the Dispatcher can
/// classify errors uniformly (§7).
pub trait Classify {
    fn class(&self) -> ErrorClass;
}

/// Raised by `insert_state` (§4.5 step 3) when the incoming timestamp is
/// older than the SupItem's currently stored state. Not an error — the
/// pipeline terminates silently: no history entry, no correlation (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleState {
    /// Timestamp currently stored for this SupItem.
    pub current: i64,
    /// Timestamp carried by the message that was rejected as stale.
    pub received: i64,
}

/// Raised by `insert_history` (§4.5 step 4) when the incoming state is
/// nominal AND no open correvent exists for the SupItem. Short-circuits the
/// pipeline successfully without running rules (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoProblem;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
