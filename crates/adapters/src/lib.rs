// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! External collaborator boundaries named but not implemented by the core
//! (§1): the bus transport and the ticket workflow, plus the connection
//! lifecycle that ties the Rule Runner Pool and Dispatcher to the bus's
//! up/down state (§4.3, §4.7, §5).

mod bus;
mod connection;
mod error;
mod ticket;

pub use bus::{BusAdapter, LoggingBusAdapter};
pub use connection::{connection_channel, ConnectionHandle, ConnectionWatch};
pub use error::BusError;
pub use ticket::TicketAdapter;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    pub use crate::bus::test_support::*;
    pub use crate::ticket::test_support::*;
}
