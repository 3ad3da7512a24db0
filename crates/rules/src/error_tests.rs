// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;

#[test]
fn timeout_and_crash_are_rule_failures_not_transient() {
    assert_eq!(RuleError::Timeout { rule: "r".into() }.class(), ErrorClass::RuleFailure);
    assert_eq!(
        RuleError::Crashed { rule: "r".into(), detail: "boom".into() }.class(),
        ErrorClass::RuleFailure
    );
}

#[test]
fn pool_stopped_is_transient() {
    assert_eq!(RuleError::PoolStopped.class(), ErrorClass::Transient);
}
