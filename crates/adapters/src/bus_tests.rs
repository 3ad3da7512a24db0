// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::test_support::InMemoryBusAdapter;
use super::*;

#[tokio::test]
async fn publish_records_items_in_order() {
    let bus = InMemoryBusAdapter::new();
    bus.publish("<a/>").await.unwrap();
    bus.publish("<b/>").await.unwrap();
    assert_eq!(bus.published(), vec!["<a/>".to_string(), "<b/>".to_string()]);
}

#[tokio::test]
async fn fail_next_publishes_simulates_an_outage() {
    let bus = InMemoryBusAdapter::new();
    bus.fail_next_publishes(1);
    assert!(bus.publish("<a/>").await.is_err());
    bus.publish("<b/>").await.unwrap();
    assert_eq!(bus.published(), vec!["<b/>".to_string()]);
}
