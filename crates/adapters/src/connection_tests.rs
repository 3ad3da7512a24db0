// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;

#[tokio::test]
async fn starts_in_requested_initial_state() {
    let (_handle, watch) = connection_channel(true);
    assert!(watch.is_connected());
}

#[tokio::test]
async fn set_connected_is_observed_by_watch() {
    let (handle, mut watch) = connection_channel(true);
    handle.set_connected(false);
    assert!(!watch.changed().await);
    assert!(!watch.is_connected());
}
