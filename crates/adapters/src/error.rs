// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use vigil_core::{Classify, ErrorClass};

/// Errors surfaced by the bus and ticket-workflow boundaries (§1, §7). Both
/// boundaries are external collaborators; this crate only specifies their
/// interface, not their transport.
#[derive(Debug, thiserror::Error, Clone)]
pub enum BusError {
    /// The bus connection is down, or publish acknowledgement didn't
    /// arrive. Transient: the Dispatcher re-enqueues the original message
    /// (§7, `TransientBus`).
    #[error("bus unavailable: {0}")]
    Unavailable(String),
    /// The external ticket workflow rejected the mutation.
    #[error("ticket workflow rejected the update: {0}")]
    TicketRejected(String),
}

impl Classify for BusError {
    fn class(&self) -> ErrorClass {
        match self {
            BusError::Unavailable(_) => ErrorClass::Transient,
            BusError::TicketRejected(_) => ErrorClass::Permanent,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
