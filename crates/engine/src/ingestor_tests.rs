// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;
use vigil_context::InMemoryContextStore;
use vigil_core::{EventPayload, TicketPayload};
use vigil_storage::InMemoryStorageGateway;

fn event(host: Option<&str>, state: &str, timestamp: i64) -> EventPayload {
    EventPayload {
        host: host.map(str::to_string),
        service: None,
        state: state.to_string(),
        timestamp,
        message: format!("{state} at {timestamp}"),
        impacted_hls: Vec::new(),
        ticket_id: None,
        acknowledgement_status: None,
    }
}

#[tokio::test]
async fn first_problem_event_seeds_context_and_returns_event_ingest() {
    let gw = InMemoryStorageGateway::new();
    let ctx = InMemoryContextStore::new();
    let payload = Payload::Event(event(Some("host1"), "DOWN", 100));

    let outcome = ingest(&gw, &ctx, "m-1", &payload, "nagios-hls").await.unwrap();
    let ingested = match outcome {
        IngestOutcome::Event(e) => e,
        other => panic!("expected Event, got {other:?}"),
    };
    assert_eq!(ingested.state, StateName::Down);
    assert_eq!(ingested.host.as_deref(), Some("host1"));
    assert!(!ingested.is_hls);

    assert_eq!(ctx.get("m-1", HOSTNAME).await.unwrap(), Some(serde_json::json!("host1")));
    assert_eq!(ctx.get("m-1", STATENAME).await.unwrap(), Some(serde_json::json!("DOWN")));
    assert!(ctx.get("m-1", RAW_EVENT_ID).await.unwrap().is_some());
}

#[tokio::test]
async fn stale_timestamp_short_circuits() {
    let gw = InMemoryStorageGateway::new();
    let ctx = InMemoryContextStore::new();
    ingest(&gw, &ctx, "m-1", &Payload::Event(event(Some("host1"), "DOWN", 100)), "h").await.unwrap();

    let outcome =
        ingest(&gw, &ctx, "m-2", &Payload::Event(event(Some("host1"), "UP", 50)), "h").await.unwrap();
    assert!(matches!(outcome, IngestOutcome::Stale));
}

#[tokio::test]
async fn nominal_state_with_no_open_correvent_short_circuits() {
    let gw = InMemoryStorageGateway::new();
    let ctx = InMemoryContextStore::new();

    let outcome =
        ingest(&gw, &ctx, "m-1", &Payload::Event(event(Some("host1"), "UP", 100)), "h").await.unwrap();
    assert!(matches!(outcome, IngestOutcome::NoProblem));
}

#[tokio::test]
async fn host_matching_hls_sentinel_is_treated_as_hls() {
    let gw = InMemoryStorageGateway::new();
    let ctx = InMemoryContextStore::new();

    let outcome = ingest(
        &gw,
        &ctx,
        "m-1",
        &Payload::Event(event(Some("nagios-hls"), "CRITICAL", 100)),
        "nagios-hls",
    )
    .await
    .unwrap();
    let ingested = match outcome {
        IngestOutcome::Event(e) => e,
        other => panic!("expected Event, got {other:?}"),
    };
    assert!(ingested.is_hls);
    assert!(ingested.host.is_none());
}

#[tokio::test]
async fn computation_order_dedupes_and_seeds_context() {
    let gw = InMemoryStorageGateway::new();
    let ctx = InMemoryContextStore::new();
    let payload = Payload::ComputationOrder(vec!["svc-a".into(), "svc-b".into(), "svc-a".into()]);

    let outcome = ingest(&gw, &ctx, "m-1", &payload, "h").await.unwrap();
    match outcome {
        IngestOutcome::ComputationOrder { impacted_hls } => {
            assert_eq!(impacted_hls, vec!["svc-a".to_string(), "svc-b".to_string()]);
        }
        other => panic!("expected ComputationOrder, got {other:?}"),
    }
    assert_eq!(
        ctx.get("m-1", IMPACTED_HLS).await.unwrap(),
        Some(serde_json::json!(["svc-a", "svc-b"]))
    );
}

#[tokio::test]
async fn ticket_payload_acknowledges_the_open_correvent() {
    let gw = InMemoryStorageGateway::new();
    let ctx = InMemoryContextStore::new();
    ingest(&gw, &ctx, "m-1", &Payload::Event(event(Some("host1"), "DOWN", 100)), "h").await.unwrap();

    let ticket = TicketPayload {
        host: Some("host1".to_string()),
        service: None,
        ticket_id: Some("TCK-1".to_string()),
        acknowledgement_status: Some("ACK".to_string()),
        message: None,
    };
    let outcome = ingest(&gw, &ctx, "m-2", &Payload::Ticket(ticket), "h").await.unwrap();
    assert!(matches!(outcome, IngestOutcome::Ticket));

    let supitem = gw.get_or_create_supitem(Some("host1"), None).await.unwrap();
    let correvent = gw.open_correvent_for_supitem(supitem.id).await.unwrap().unwrap();
    assert_eq!(correvent.ticket.as_deref(), Some("TCK-1"));
    assert_eq!(correvent.ack, vigil_core::AckStatus::Ack);
}

#[tokio::test]
async fn ticket_for_supitem_with_no_open_correvent_is_a_no_op() {
    let gw = InMemoryStorageGateway::new();
    let ctx = InMemoryContextStore::new();
    let ticket = TicketPayload {
        host: Some("host1".to_string()),
        service: None,
        ticket_id: Some("TCK-1".to_string()),
        acknowledgement_status: None,
        message: None,
    };
    let outcome = ingest(&gw, &ctx, "m-1", &Payload::Ticket(ticket), "h").await.unwrap();
    assert!(matches!(outcome, IngestOutcome::Ticket));
}

#[tokio::test]
async fn other_payload_passes_through() {
    let gw = InMemoryStorageGateway::new();
    let ctx = InMemoryContextStore::new();
    let outcome = ingest(&gw, &ctx, "m-1", &Payload::Other, "h").await.unwrap();
    assert!(matches!(outcome, IngestOutcome::Other));
}
