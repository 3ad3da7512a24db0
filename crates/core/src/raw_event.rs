// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The current state record for a supervised item.

use crate::define_id;
use crate::state::StateName;
use crate::supitem::SupItemId;
use serde::{Deserialize, Serialize};

define_id! {
    /// Identifies a [`RawEvent`] row.
    pub struct RawEventId("raw-");
}

/// One per [`SupItemId`] (unique). Mutated in place on each state change for
/// the same SupItem; never deleted by the engine (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: RawEventId,
    pub supitem_id: SupItemId,
    pub current_state: StateName,
    pub message: String,
    /// Unix timestamp of the most recently applied state change.
    pub timestamp: i64,
}

impl RawEvent {
    pub fn new(
        id: RawEventId,
        supitem_id: SupItemId,
        current_state: StateName,
        message: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self { id, supitem_id, current_state, message: message.into(), timestamp }
    }

    /// Apply a newer state in place. Callers must have already checked the
    /// incoming timestamp isn't older than `self.timestamp` (see
    /// `OldStateReceived` in §4.5); this method does not re-check it.
    pub fn apply_state(&mut self, state: StateName, message: impl Into<String>, timestamp: i64) {
        self.current_state = state;
        self.message = message.into();
        self.timestamp = timestamp;
    }
}

#[cfg(test)]
#[path = "raw_event_tests.rs"]
mod tests;
