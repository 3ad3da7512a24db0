// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;

#[test]
fn host_supitem_has_no_service() {
    let item = SupItem::host(SupItemId::new(), "web1");
    assert_eq!(item.host.as_deref(), Some("web1"));
    assert!(item.service.is_none());
    assert!(!item.is_hls());
}

#[test]
fn hls_supitem_has_no_host() {
    let item = SupItem::hls(SupItemId::new(), "billing");
    assert!(item.host.is_none());
    assert_eq!(item.service.as_deref(), Some("billing"));
    assert!(item.is_hls());
}

#[test]
fn key_reflects_host_and_service() {
    let item = SupItem::service(SupItemId::new(), "web1", "cpu");
    assert_eq!(item.key(), (Some("web1"), Some("cpu")));
}
