// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;

#[test]
fn timeout_is_transient() {
    assert_eq!(ContextError::Timeout.class(), ErrorClass::Transient);
}

#[test]
fn decode_is_permanent() {
    let err = ContextError::Decode { key: "statename".to_string(), expected: "i64" };
    assert_eq!(err.class(), ErrorClass::Permanent);
}
