// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The ticket workflow boundary (§1, §4.5): validates an inbound ticket
//! mutation against the external incident-ticket system before it's applied
//! to the correvent it targets. Out of scope beyond this interface (§1).

use async_trait::async_trait;
use vigil_core::TicketPayload;

use crate::BusError;

#[async_trait]
pub trait TicketAdapter: Send + Sync {
    /// Validate/normalize a `Ticket` payload. An error here is a
    /// `BusError::TicketRejected`, which is permanent (§7): the message is
    /// dropped and logged, not retried.
    async fn validate(&self, payload: &TicketPayload) -> Result<(), BusError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;

    /// Accepts every ticket payload, for tests that don't exercise the
    /// ticket-rejection path.
    #[derive(Default)]
    pub struct FakeTicketAdapter;

    impl FakeTicketAdapter {
        pub fn new() -> Self {
            Self
        }
    }

    #[async_trait]
    impl TicketAdapter for FakeTicketAdapter {
        async fn validate(&self, _payload: &TicketPayload) -> Result<(), BusError> {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "ticket_tests.rs"]
mod tests;
