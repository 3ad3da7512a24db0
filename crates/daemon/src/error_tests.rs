// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;
use vigil_core::ErrorClass;

#[test]
fn pool_stopped_is_transient() {
    assert_eq!(DispatchError::PoolStopped.class(), ErrorClass::Transient);
}

#[test]
fn bus_unavailable_is_transient() {
    let err = DispatchError::from(BusError::Unavailable("down".to_string()));
    assert_eq!(err.class(), ErrorClass::Transient);
}

#[test]
fn engine_invalid_message_is_permanent() {
    let err = DispatchError::from(EngineError::InvalidMessage("missing id".to_string()));
    assert_eq!(err.class(), ErrorClass::Permanent);
}
