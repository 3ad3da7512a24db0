// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! State names for supervised items.
//!
//! A "nominal" state (UP for a host, OK for a service) never has an open
//! correvent created for it; anything else is a "problem" state (see §3,
//! Invariants).

use serde::{Deserialize, Serialize};

/// The current state of a [`crate::SupItem`].
///
/// Hosts use `Up`/`Down`/`Unreachable`; services use `Ok`/`Warning`/
/// `Critical`/`Unknown`. The two families share one enum because a RawEvent
/// doesn't otherwise know which kind of SupItem it describes, and rules
/// only ever need to ask "is this nominal?" or compare raw state names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateName {
    Up,
    Down,
    Unreachable,
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl StateName {
    /// Parse a wire state name (case-insensitive). Unrecognized names map to
    /// `Unknown` rather than failing — an unfamiliar state string from a
    /// plugin is still a problem state, just not one we have better words for.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "UP" => StateName::Up,
            "DOWN" => StateName::Down,
            "UNREACHABLE" => StateName::Unreachable,
            "OK" => StateName::Ok,
            "WARNING" => StateName::Warning,
            "CRITICAL" => StateName::Critical,
            _ => StateName::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StateName::Up => "UP",
            StateName::Down => "DOWN",
            StateName::Unreachable => "UNREACHABLE",
            StateName::Ok => "OK",
            StateName::Warning => "WARNING",
            StateName::Critical => "CRITICAL",
            StateName::Unknown => "UNKNOWN",
        }
    }

    /// UP (hosts) and OK (services) are nominal; everything else is a
    /// problem state (§3, Invariants).
    pub fn is_nominal(&self) -> bool {
        matches!(self, StateName::Up | StateName::Ok)
    }

    pub fn is_problem(&self) -> bool {
        !self.is_nominal()
    }
}

impl std::fmt::Display for StateName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
