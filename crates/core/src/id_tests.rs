// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use crate::define_id;

define_id! {
    pub struct TestId("tst-");
}

#[test]
fn new_has_stable_prefix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.as_str().len(), 23);
}

#[test]
fn from_string_round_trips() {
    let id = TestId::from_string("tst-abcdefghijklmnopqrs");
    assert_eq!(id.as_str(), "tst-abcdefghijklmnopqrs");
}

#[test]
fn display_matches_as_str() {
    let id = TestId::new();
    assert_eq!(format!("{id}"), id.as_str());
}

#[test]
fn distinct_ids_are_not_equal() {
    assert_ne!(TestId::new(), TestId::new());
}
