// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Event Ingestor and State/History Writer (§4.5): classifies a decoded
//! [`Payload`], resolves the HLS sentinel, upserts the SupItem's state, and
//! decides whether the pipeline short-circuits (`OldStateReceived`,
//! `NoProblem`) or continues into the rule DAG and Correvent Manager.

use crate::EngineError;
use serde_json::json;
use vigil_context::ContextStore;
use vigil_core::{
    EventPayload, Payload, RawEventId, StateName, SupItemId, TicketPayload, HOSTNAME, IMPACTED_HLS,
    PAYLOAD, PREVIOUS_STATE, RAW_EVENT_ID, SERVICENAME, STATENAME, TIMESTAMP,
};
use vigil_storage::{HistoryOutcome, StateOutcome, StorageGateway};

/// A fully ingested `Event` payload, ready for the rule DAG and Correvent
/// Manager (§4.5 steps 1-4 complete).
#[derive(Debug, Clone)]
pub struct EventIngest {
    pub supitem_id: SupItemId,
    pub raw_event_id: RawEventId,
    pub host: Option<String>,
    pub service: Option<String>,
    pub state: StateName,
    pub previous_state: StateName,
    pub timestamp: i64,
    pub message: String,
    pub is_hls: bool,
}

/// What the Ingestor decided to do with one message (§4.5, §7).
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Event(EventIngest),
    /// A `Ticket` payload was applied; no rules run (§4.5).
    Ticket,
    ComputationOrder { impacted_hls: Vec<String> },
    /// `OldStateReceived`: the incoming timestamp was older than what's on
    /// record. The pipeline terminates silently (§4.5 step 3, §7).
    Stale,
    /// `NoProblemException`: a nominal state with no open Correvent. The
    /// pipeline short-circuits successfully without running rules (§4.5
    /// step 4, §7).
    NoProblem,
    /// A recognized-but-out-of-scope bus item (§3).
    Other,
}

/// Run §4.5 steps 1-6 for one message's payload.
pub async fn ingest(
    storage: &dyn StorageGateway,
    context: &dyn ContextStore,
    message_id: &str,
    payload: &Payload,
    nagios_hls_host: &str,
) -> Result<IngestOutcome, EngineError> {
    match payload {
        Payload::Event(event) => ingest_event(storage, context, message_id, event, nagios_hls_host).await,
        Payload::Ticket(ticket) => {
            apply_ticket(storage, ticket).await?;
            Ok(IngestOutcome::Ticket)
        }
        Payload::ComputationOrder(hls) => {
            let mut deduped = Vec::new();
            for name in hls {
                if !deduped.contains(name) {
                    deduped.push(name.clone());
                }
            }
            context.set(message_id, IMPACTED_HLS, json!(deduped)).await?;
            Ok(IngestOutcome::ComputationOrder { impacted_hls: deduped })
        }
        Payload::Other => Ok(IngestOutcome::Other),
    }
}

async fn ingest_event(
    storage: &dyn StorageGateway,
    context: &dyn ContextStore,
    message_id: &str,
    event: &EventPayload,
    nagios_hls_host: &str,
) -> Result<IngestOutcome, EngineError> {
    let mut event = event.clone();
    event.resolve_hls_sentinel(nagios_hls_host);

    // Step 1: resolve the SupItem.
    let supitem = storage.get_or_create_supitem(event.host.as_deref(), event.service.as_deref()).await?;

    // Step 2: seed Context with the fields every rule can rely on.
    context.set(message_id, HOSTNAME, json!(event.host)).await?;
    context.set(message_id, SERVICENAME, json!(event.service)).await?;
    context.set(message_id, STATENAME, json!(event.state)).await?;
    context.set(message_id, TIMESTAMP, json!(event.timestamp)).await?;

    // Step 3: upsert the state row.
    let state = StateName::parse(&event.state);
    let (raw_event_id, previous) =
        match storage.insert_state(supitem.id, state, &event.message, event.timestamp).await? {
            StateOutcome::Stale(_) => return Ok(IngestOutcome::Stale),
            StateOutcome::Accepted { raw_event_id, previous } => (raw_event_id, previous),
        };

    // Step 4: history entry, which is also where `NoProblem` short-circuits.
    let is_hls = event.is_hls();
    let history = if is_hls {
        storage.insert_hls_history(raw_event_id).await?
    } else {
        storage.insert_event(raw_event_id).await?
    };
    if matches!(history, HistoryOutcome::NoProblem) {
        return Ok(IngestOutcome::NoProblem);
    }

    // Step 6: seed the remaining Context keys.
    context.set(message_id, PAYLOAD, json!(event.message)).await?;
    context.set(message_id, PREVIOUS_STATE, json!(previous.as_str())).await?;
    context.set(message_id, RAW_EVENT_ID, json!(raw_event_id.as_str())).await?;

    Ok(IngestOutcome::Event(EventIngest {
        supitem_id: supitem.id,
        raw_event_id,
        host: event.host,
        service: event.service,
        state,
        previous_state: previous,
        timestamp: event.timestamp,
        message: event.message,
        is_hls,
    }))
}

/// `handle_ticket` (§4.5): applies an ack/ticket mutation to the Correvent
/// currently open for the ticket's SupItem, if any. No rules run for this
/// payload kind.
async fn apply_ticket(storage: &dyn StorageGateway, ticket: &TicketPayload) -> Result<(), EngineError> {
    let supitem = storage.get_or_create_supitem(ticket.host.as_deref(), ticket.service.as_deref()).await?;
    let Some(correvent) = storage.open_correvent_for_supitem(supitem.id).await? else {
        return Ok(());
    };

    if let Some(ticket_id) = &ticket.ticket_id {
        storage.set_ticket(correvent.id, Some(ticket_id.clone())).await?;
    }
    if let Some(status) = ticket.acknowledgement_status.as_deref() {
        storage.set_ack(correvent.id, parse_ack(status)).await?;
    }
    Ok(())
}

fn parse_ack(raw: &str) -> vigil_core::AckStatus {
    match raw.to_ascii_uppercase().as_str() {
        "ACK" | "ACKNOWLEDGED" => vigil_core::AckStatus::Ack,
        "CLOSED" => vigil_core::AckStatus::Closed,
        _ => vigil_core::AckStatus::None,
    }
}

#[cfg(test)]
#[path = "ingestor_tests.rs"]
mod tests;
