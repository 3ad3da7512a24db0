// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Domain types shared by every correlator crate: identifiers, the SupItem /
//! RawEvent / Correvent model, the dependency topology, bus message shapes,
//! context-store key conventions, the error taxonomy, a clock abstraction,
//! and configuration.

#[macro_use]
pub mod id;

mod clock;
mod config;
mod context_keys;
mod correvent;
mod error;
mod message;
mod raw_event;
mod state;
mod supitem;
mod topology;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::Config;
pub use context_keys::{
    open_aggr_key, HOSTNAME, IDSUPITEM, IMPACTED_HLS, PAYLOAD, PREDECESSORS_AGGREGATES,
    PREVIOUS_STATE, RAW_EVENT_ID, SERVICENAME, STATENAME, SUCCESSORS_AGGREGATES, TIMESTAMP,
};
pub use correvent::{AckStatus, Correvent, CorreventId};
pub use error::{Classify, ErrorClass, NoProblem, StaleState};
pub use id::IdBuf;
pub use message::{EventPayload, Message, MessageId, Payload, TicketPayload};
pub use raw_event::{RawEvent, RawEventId};
pub use state::StateName;
pub use supitem::{SupItem, SupItemId};
pub use topology::{Dependency, DependencyGroup, Topology};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    pub use crate::config::test_support::*;
    pub use crate::correvent::test_support::*;
    pub use crate::supitem::test_support::*;
    pub use crate::topology::test_support::*;
}
