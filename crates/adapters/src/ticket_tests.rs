// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::test_support::FakeTicketAdapter;
use super::*;
use vigil_core::TicketPayload;

#[tokio::test]
async fn fake_adapter_accepts_any_payload() {
    let adapter = FakeTicketAdapter::new();
    let payload = TicketPayload { ticket_id: Some("t-1".to_string()), ..Default::default() };
    assert!(adapter.validate(&payload).await.is_ok());
}
