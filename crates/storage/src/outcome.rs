// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use vigil_core::{RawEventId, StaleState, StateName};

/// Result of `insert_state` (§4.5 step 3). Not every variant is an error:
/// `Stale` is the expected, silent "ignore this message" outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateOutcome {
    /// The incoming timestamp was newer than what was stored; the row was
    /// updated and the previous state is returned for rules/history to
    /// compare against.
    Accepted { raw_event_id: RawEventId, previous: StateName },
    /// The incoming timestamp was older than the stored one (`OldStateReceived`
    /// in the original system). The pipeline terminates silently.
    Stale(StaleState),
}

/// Result of `insert_event` / `insert_hls_history` (§4.5 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// A history row was written; rules should run.
    Inserted,
    /// The incoming state was nominal and no Correvent was open for this
    /// SupItem. The pipeline short-circuits successfully without running
    /// rules (`NoProblemException` in the original system).
    NoProblem,
}
