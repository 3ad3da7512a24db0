// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;

#[test]
fn wrapped_errors_delegate_classification() {
    assert_eq!(EngineError::from(ContextError::Timeout).class(), ErrorClass::Transient);
    assert_eq!(EngineError::from(DbError::Fatal("x".into())).class(), ErrorClass::Fatal);
    assert_eq!(
        EngineError::from(RuleError::Timeout { rule: "r".into() }).class(),
        ErrorClass::RuleFailure
    );
}

#[test]
fn invalid_message_and_missing_hls_rule_are_permanent() {
    assert_eq!(EngineError::InvalidMessage("missing id".into()).class(), ErrorClass::Permanent);
    assert_eq!(EngineError::HlsRuleNotRegistered.class(), ErrorClass::Permanent);
}
