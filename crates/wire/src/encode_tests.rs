// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;
use crate::decode_item;
use vigil_core::{AckStatus, Payload, RawEventId, StateName};

#[test]
fn state_update_roundtrips_through_the_decoder_as_an_item() {
    let xml = encode_state_update(&StateUpdate {
        message_id: "m1",
        host: Some("srv1"),
        service: Some("cpu"),
        state: StateName::Critical,
        timestamp: 42,
        message: "load too high",
    });
    assert!(xml.contains("srv1"));
    assert!(xml.contains("CRITICAL"));

    // Outbound items use the same envelope the Ingestor decodes, even
    // though `<state>` itself isn't one of the three correlator payload
    // kinds (it's classified `Other` on the way back in).
    let decoded = decode_item(&xml).unwrap();
    assert_eq!(decoded.id.as_str(), "m1");
    assert_eq!(decoded.payload, Payload::Other);
}

#[test]
fn correvent_notification_contains_members_and_ack() {
    let member = RawEventId::new();
    let xml = encode_correvent_notification(&CorreventNotification {
        message_id: "m2",
        correvent_id: "cev-abc",
        cause_host: Some("srv1"),
        cause_service: None,
        priority: 3,
        ack: AckStatus::Ack,
        members: std::slice::from_ref(&member),
    });
    assert!(xml.contains("cev-abc"));
    assert!(xml.contains("ACK"));
    assert!(xml.contains(member.as_str()));
    assert!(!xml.contains("cause_service"));
}
