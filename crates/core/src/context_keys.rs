// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Standard keys used in the per-message [Context](crate) scratchpad (§3,
//! §4.1). Kept as plain string constants (not an enum) because rules are
//! black boxes that address the context by name; see §4.2.

use crate::supitem::SupItemId;

pub const HOSTNAME: &str = "hostname";
pub const SERVICENAME: &str = "servicename";
pub const STATENAME: &str = "statename";
pub const TIMESTAMP: &str = "timestamp";
pub const IDSUPITEM: &str = "idsupitem";
pub const PAYLOAD: &str = "payload";
pub const PREVIOUS_STATE: &str = "previous_state";
pub const RAW_EVENT_ID: &str = "raw_event_id";
pub const IMPACTED_HLS: &str = "impacted_hls";
pub const PREDECESSORS_AGGREGATES: &str = "predecessors_aggregates";
pub const SUCCESSORS_AGGREGATES: &str = "successors_aggregates";

/// The shared key holding the currently open correvent id for a SupItem
/// (`0` meaning none), per §3/§4.6.
pub fn open_aggr_key(supitem: SupItemId) -> String {
    format!("open_aggr:{supitem}")
}

#[cfg(test)]
#[path = "context_keys_tests.rs"]
mod tests;
