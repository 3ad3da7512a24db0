// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use vigil_adapters::BusError;
use vigil_core::{Classify, ErrorClass};
use vigil_engine::EngineError;

/// Errors surfaced by the Dispatcher (§4.7, §7). Wraps every per-crate
/// error the pipeline can raise so `Dispatcher::forward` can classify it
/// without matching on crate-specific variants (§7, propagation policy).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Bus(#[from] BusError),
    /// The rule runner pool is currently stopped because the bus is
    /// disconnected (§4.3): "the Dispatcher refuses new work and returns
    /// retryable errors."
    #[error("rule runner pool is stopped (bus disconnected)")]
    PoolStopped,
}

impl Classify for DispatchError {
    fn class(&self) -> ErrorClass {
        match self {
            DispatchError::Engine(e) => e.class(),
            DispatchError::Bus(e) => e.class(),
            DispatchError::PoolStopped => ErrorClass::Transient,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
