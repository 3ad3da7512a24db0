// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The Executor (§4.2): materializes the fixed [`RuleDag`] into a per-message
//! run instance and drives it.
//!
//! Each node fires only once every one of its `parents_of` has completed
//! (successfully, by failure, or by timeout) — never before. The virtual
//! end node is modeled implicitly: `run` only returns once every rule's task
//! has finished. Per Design Note 9(a), a non-mandatory rule's failure does
//! not stop its descendants (partial-success default); a `mandatory` rule's
//! failure instead short-circuits every rule that hasn't started yet.

use crate::EngineError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{error, warn};
use vigil_rules::{RuleContext, RuleDag, RuleError, RuleRunnerPool};

/// Outcome of running the rule DAG for one message: every rule's result,
/// keyed by rule name, plus whether a mandatory rule's failure
/// short-circuited the rest of the DAG.
#[derive(Debug, Default)]
pub struct ExecutorReport {
    pub results: HashMap<String, Result<serde_json::Value, RuleError>>,
    pub short_circuited: bool,
}

async fn wait_true(rx: &mut watch::Receiver<bool>) {
    if *rx.borrow() {
        return;
    }
    while rx.changed().await.is_ok() {
        if *rx.borrow() {
            return;
        }
    }
}

/// Run every rule in `dag` for one message against `ctx`, respecting
/// dependency order (§4.2).
pub async fn run_dag(
    dag: &RuleDag,
    pool: Arc<RuleRunnerPool>,
    ctx: Arc<dyn RuleContext>,
    message_id: Arc<str>,
    payload_xml: Arc<str>,
) -> Result<ExecutorReport, EngineError> {
    let n = dag.rule_count();
    if n == 0 {
        return Ok(ExecutorReport::default());
    }

    let channels: Vec<(watch::Sender<bool>, watch::Receiver<bool>)> =
        (0..n).map(|_| watch::channel(false)).collect();
    let senders: Vec<watch::Sender<bool>> = channels.iter().map(|(tx, _)| tx.clone()).collect();
    let receivers: Vec<watch::Receiver<bool>> = channels.into_iter().map(|(_, rx)| rx).collect();

    let mandatory_failed = Arc::new(AtomicBool::new(false));
    let results = Arc::new(Mutex::new(HashMap::new()));

    let mut handles = Vec::with_capacity(n);
    for idx in 0..n {
        let parents = dag.parents_of(idx).to_vec();
        let mut parent_rxs: Vec<watch::Receiver<bool>> =
            parents.iter().map(|&p| receivers[p].clone()).collect();
        let tx = senders[idx].clone();
        let rule = dag.rule_at(idx).clone();
        let pool = pool.clone();
        let ctx = ctx.clone();
        let message_id = message_id.clone();
        let payload_xml = payload_xml.clone();
        let mandatory_failed = mandatory_failed.clone();
        let results = results.clone();

        handles.push(tokio::spawn(async move {
            for rx in parent_rxs.iter_mut() {
                wait_true(rx).await;
            }

            let name = rule.name().to_string();
            if mandatory_failed.load(Ordering::SeqCst) {
                warn!(rule = %name, "skipped: an upstream mandatory rule failed");
                let _ = tx.send(true);
                return;
            }

            let outcome =
                pool.dispatch(rule.clone(), ctx.clone(), message_id.clone(), payload_xml.clone()).await;
            match &outcome {
                Ok(_) => {}
                Err(err) => {
                    error!(rule = %name, error = %err, "rule failed");
                    if rule.mandatory() {
                        mandatory_failed.store(true, Ordering::SeqCst);
                    }
                }
            }
            results.lock().await.insert(name, outcome);
            let _ = tx.send(true);
        }));
    }

    for handle in handles {
        // A join error here means the supervising task itself panicked,
        // which `RuleRunnerPool::dispatch` already isolates against; this
        // can only happen from a bug in the executor loop itself.
        handle.await.map_err(|e| {
            EngineError::Rule(RuleError::Crashed { rule: "<executor>".to_string(), detail: e.to_string() })
        })?;
    }

    let results = match Arc::try_unwrap(results) {
        Ok(mutex) => mutex.into_inner(),
        // Every spawned task's sender clone is dropped by the time its
        // `handle.await` above returns, so this Arc is always unique here;
        // fall back to cloning through the lock rather than panicking.
        Err(shared) => shared.lock().await.clone(),
    };
    let short_circuited = mandatory_failed.load(Ordering::SeqCst);
    Ok(ExecutorReport { results, short_circuited })
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
