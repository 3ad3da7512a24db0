// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Correlated events (correvents): aggregates of raw events sharing a
//! causal root (§3).

use crate::define_id;
use crate::raw_event::RawEventId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

define_id! {
    /// Identifies a [`Correvent`] row.
    pub struct CorreventId("cev-");
}

/// Acknowledgement status of a correvent. Transitions arrive exclusively
/// through the Ticket payload path (§4.5) — the correlation pipeline itself
/// never produces `Ack` or `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AckStatus {
    None,
    Ack,
    Closed,
}

/// An aggregate of [`RawEvent`](crate::RawEvent)s rooted at one cause.
///
/// Invariants (§3):
/// - `cause` is always a member of `members`.
/// - each RawEvent's SupItem is the cause of at most one live Correvent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correvent {
    pub id: CorreventId,
    pub cause: RawEventId,
    pub priority: i32,
    pub ticket: Option<String>,
    pub ack: AckStatus,
    pub occurrence: u32,
    pub activation_timestamp: i64,
    pub members: BTreeSet<RawEventId>,
    /// Set by desaggregation when the cause returns to nominal (§4.6). A
    /// resolved correvent is kept as historical record, not deleted, so it
    /// is distinct from a freshly created one even though both can have
    /// `members == {cause}`.
    pub resolved: bool,
}

impl Correvent {
    /// Create a new correvent rooted at `cause`, with `cause` as its sole
    /// initial member (§3 invariant: cause is always a member).
    pub fn new(id: CorreventId, cause: RawEventId, priority: i32, activation_timestamp: i64) -> Self {
        let mut members = BTreeSet::new();
        members.insert(cause);
        Self {
            id,
            cause,
            priority,
            ticket: None,
            ack: AckStatus::None,
            occurrence: 1,
            activation_timestamp,
            members,
            resolved: false,
        }
    }

    pub fn add_member(&mut self, raw_event: RawEventId) -> bool {
        self.members.insert(raw_event)
    }

    pub fn remove_member(&mut self, raw_event: &RawEventId) -> bool {
        if *raw_event == self.cause {
            // Cause is never removed as a member directly; desaggregation
            // replaces the whole membership set instead (§4.6).
            return false;
        }
        self.members.remove(raw_event)
    }

    pub fn bump_occurrence(&mut self, activation_timestamp: i64) {
        self.occurrence += 1;
        self.activation_timestamp = activation_timestamp;
    }

    pub fn is_resolved_only_cause(&self) -> bool {
        self.members.len() == 1 && self.members.contains(&self.cause)
    }

    /// Desaggregation: drop every member except the cause and mark the
    /// aggregate resolved. Callers are responsible for re-homing the
    /// dropped members elsewhere first (§4.6, Desaggregate).
    pub fn resolve(&mut self) {
        self.members.retain(|m| *m == self.cause);
        self.resolved = true;
    }

    /// A problem recurring at the cause reopens a previously resolved
    /// aggregate instead of requiring a new one.
    pub fn reopen(&mut self) {
        self.resolved = false;
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;

    pub fn trivial_correvent(cause: RawEventId) -> Correvent {
        Correvent::new(CorreventId::new(), cause, 0, 0)
    }
}

#[cfg(test)]
#[path = "correvent_tests.rs"]
mod tests;
