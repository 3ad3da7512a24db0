// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;
use std::time::Duration;
use vigil_rules::test_support::FakeRule;
use vigil_rules::{RuleContext, RuleRegistry, RuleRunnerPool};

fn pool(timeout: Option<Duration>) -> Arc<RuleRunnerPool> {
    let pool = Arc::new(RuleRunnerPool::new(8, timeout));
    pool.start();
    pool
}

async fn dag_of(rules: Vec<Arc<dyn vigil_rules::Rule>>) -> RuleDag {
    let mut registry = RuleRegistry::new();
    for rule in rules {
        registry.register(rule).unwrap();
    }
    registry.build_dag().unwrap()
}

#[tokio::test]
async fn every_rule_runs_in_dependency_order() {
    let dag = dag_of(vec![
        Arc::new(FakeRule::new("a")),
        Arc::new(FakeRule::new("b").depending_on(&["a"])),
        Arc::new(FakeRule::new("c").depending_on(&["b"])),
    ])
    .await;
    let ctx: Arc<dyn RuleContext> = Arc::new(vigil_rules::test_support::FakeRuleContext::new());

    let report = run_dag(&dag, pool(None), ctx.clone(), Arc::from("m-1"), Arc::from("<event/>")).await.unwrap();

    assert!(!report.short_circuited);
    assert!(report.results["a"].is_ok());
    assert!(report.results["b"].is_ok());
    assert!(report.results["c"].is_ok());
    assert_eq!(ctx.get("ran:a").await.unwrap(), Some(serde_json::Value::from("m-1")));
    assert_eq!(ctx.get("ran:c").await.unwrap(), Some(serde_json::Value::from("m-1")));
}

#[tokio::test]
async fn mandatory_failure_skips_rules_that_have_not_started() {
    let dag = dag_of(vec![
        Arc::new(FakeRule::new("a").mandatory().panicking()),
        Arc::new(FakeRule::new("b").depending_on(&["a"])),
    ])
    .await;
    let ctx: Arc<dyn RuleContext> = Arc::new(vigil_rules::test_support::FakeRuleContext::new());

    let report = run_dag(&dag, pool(None), ctx.clone(), Arc::from("m-1"), Arc::from("<event/>")).await.unwrap();

    assert!(report.short_circuited);
    assert!(report.results["a"].is_err());
    // "b" never ran its body, so it left no trace in the context, and the
    // executor still records it as a completed (skipped) node.
    assert!(!report.results.contains_key("b"));
    assert_eq!(ctx.get("ran:b").await.unwrap(), None);
}

#[tokio::test]
async fn non_mandatory_failure_does_not_block_descendants() {
    let dag = dag_of(vec![
        Arc::new(FakeRule::new("a").panicking()),
        Arc::new(FakeRule::new("b").depending_on(&["a"])),
    ])
    .await;
    let ctx: Arc<dyn RuleContext> = Arc::new(vigil_rules::test_support::FakeRuleContext::new());

    let report = run_dag(&dag, pool(None), ctx.clone(), Arc::from("m-1"), Arc::from("<event/>")).await.unwrap();

    assert!(!report.short_circuited);
    assert!(report.results["a"].is_err());
    assert!(report.results["b"].is_ok());
    assert_eq!(ctx.get("ran:b").await.unwrap(), Some(serde_json::Value::from("m-1")));
}

#[tokio::test]
async fn independent_branch_completes_despite_a_sibling_timing_out() {
    let dag = dag_of(vec![
        Arc::new(FakeRule::new("slow").sleeping(Duration::from_millis(50))),
        Arc::new(FakeRule::new("fast")),
    ])
    .await;
    let ctx: Arc<dyn RuleContext> = Arc::new(vigil_rules::test_support::FakeRuleContext::new());

    let report =
        run_dag(&dag, pool(Some(Duration::from_millis(5))), ctx.clone(), Arc::from("m-1"), Arc::from("<event/>"))
            .await
            .unwrap();

    assert!(matches!(report.results["slow"], Err(vigil_rules::RuleError::Timeout { .. })));
    assert!(report.results["fast"].is_ok());
}
