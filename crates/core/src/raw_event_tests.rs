// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;
use crate::supitem::SupItemId;

#[test]
fn apply_state_overwrites_in_place() {
    let mut event =
        RawEvent::new(RawEventId::new(), SupItemId::new(), StateName::Up, "host is up", 1);
    event.apply_state(StateName::Down, "host is down", 2);
    assert_eq!(event.current_state, StateName::Down);
    assert_eq!(event.message, "host is down");
    assert_eq!(event.timestamp, 2);
}
