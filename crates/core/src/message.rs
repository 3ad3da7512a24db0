// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The wire-agnostic message shape (§3, §6). XML framing details live in
//! `vigil-wire`; this module only carries the tagged-variant payload that
//! downstream code is statically dispatched over (Design Note 9).

use serde::{Deserialize, Serialize};

/// A message id as carried on the bus item's `id` attribute. Required,
/// unicode, and opaque — not one of our own generated ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fields extracted from an `<event>` payload (§3, §6).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    /// `None` for HLS carriers (see [`EventPayload::resolve_hls_sentinel`]).
    pub host: Option<String>,
    /// Empty for host-only events.
    pub service: Option<String>,
    pub state: String,
    pub timestamp: i64,
    pub message: String,
    pub impacted_hls: Vec<String>,
    pub ticket_id: Option<String>,
    pub acknowledgement_status: Option<String>,
}

impl EventPayload {
    /// Null out `host` when it matches the configured HLS sentinel hostname
    /// (`nagios_hls_host`, §6), per §3: "A sentinel host name denotes
    /// 'high-level service carrier'; when matched, host is nulled and the
    /// event is treated as HLS."
    pub fn resolve_hls_sentinel(&mut self, sentinel_host: &str) {
        if self.host.as_deref() == Some(sentinel_host) {
            self.host = None;
        }
    }

    pub fn is_hls(&self) -> bool {
        self.host.is_none()
    }
}

/// Fields extracted from a `<ticket>` payload (§3, §6).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPayload {
    pub host: Option<String>,
    pub service: Option<String>,
    pub ticket_id: Option<String>,
    pub acknowledgement_status: Option<String>,
    pub message: Option<String>,
}

/// A tagged-variant payload: the statically-dispatched counterpart to the
/// wire's dynamically-typed XML root element (Design Note 9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Event(EventPayload),
    Ticket(TicketPayload),
    /// Deduplicated list of impacted HLS service names.
    ComputationOrder(Vec<String>),
    /// Recognized bus item that isn't one of the three correlator payload
    /// kinds; dropped without error (§3).
    Other,
}

/// A transient, wire-decoded notification (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub payload: Payload,
}

impl Message {
    pub fn new(id: MessageId, payload: Payload) -> Self {
        Self { id, payload }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
