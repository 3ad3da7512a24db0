// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Rule Runner Pool (§4.3): runs a rule body outside the orchestrator's
//! thread of control, with a per-invocation timeout and crash isolation.
//!
//! Per Design Note 9, the isolation mechanism isn't prescribed to be an OS
//! process — any pre-emptible isolation works. This pool runs each
//! invocation as a `tokio` task bounded by a semaphore (min/max workers) and
//! a hard timeout; a panic inside the task is caught by the `JoinHandle`
//! rather than taking down the orchestrator, matching the "a rule cannot
//! corrupt the orchestrator's memory" requirement at the async-task level.

use crate::{Rule, RuleContext, RuleError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as AsyncMutex, Semaphore};

/// Running averages of rule invocation time, used for `Dispatcher::getStats`
/// (§4.7).
#[derive(Debug, Clone, Default)]
pub struct RuleTiming {
    pub count: u64,
    pub total: Duration,
}

impl RuleTiming {
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total / self.count as u32
        }
    }
}

/// A pool that executes rule bodies with timeout and crash isolation
/// (§4.3). Started when the bus connection becomes ready, stopped on
/// disconnect, restarted on reconnect (§4.3, §5).
pub struct RuleRunnerPool {
    timeout: Option<Duration>,
    capacity: usize,
    semaphore: Arc<Semaphore>,
    running: AtomicBool,
    stats: AsyncMutex<HashMap<String, RuleTiming>>,
}

impl RuleRunnerPool {
    /// `max_workers` bounds concurrent in-flight invocations (the pool's
    /// `max_rule_runners`, §6); `timeout` is `rules_timeout` already
    /// converted to `None` for "no timeout" (§6).
    pub fn new(max_workers: u32, timeout: Option<Duration>) -> Self {
        let capacity = max_workers.max(1) as usize;
        Self {
            timeout,
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
            running: AtomicBool::new(false),
            stats: AsyncMutex::new(HashMap::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Started when the bus connection becomes ready (§4.3).
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Stopped on disconnect; while stopped, dispatch is refused (§4.3).
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Run `rule`'s body under the pool's timeout, with crash isolation.
    /// Refuses to dispatch while the pool is stopped (§4.3).
    pub async fn dispatch(
        &self,
        rule: Arc<dyn Rule>,
        ctx: Arc<dyn RuleContext>,
        message_id: Arc<str>,
        payload_xml: Arc<str>,
    ) -> Result<serde_json::Value, RuleError> {
        if !self.is_running() {
            return Err(RuleError::PoolStopped);
        }

        let permit = self.semaphore.clone().acquire_owned().await.map_err(|_| RuleError::PoolStopped)?;
        let rule_name = rule.name().to_string();
        let started = Instant::now();

        let task = tokio::spawn(async move {
            let _permit = permit;
            rule.run(ctx.as_ref(), &message_id, &payload_xml).await
        });

        let outcome = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    // The task keeps running to completion in the background
                    // (we don't have a kill switch over a tokio task), but
                    // the pool treats it as timed out immediately so the DAG
                    // isn't blocked (§4.3: "the worker is killed and
                    // replaced").
                    self.record(&rule_name, started.elapsed()).await;
                    return Err(RuleError::Timeout { rule: rule_name });
                }
            },
            None => task.await,
        };

        self.record(&rule_name, started.elapsed()).await;

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(RuleError::Crashed { rule: rule_name, detail: join_err.to_string() }),
        }
    }

    async fn record(&self, rule_name: &str, elapsed: Duration) {
        let mut stats = self.stats.lock().await;
        let timing = stats.entry(rule_name.to_string()).or_default();
        timing.count += 1;
        timing.total += elapsed;
    }

    /// Per-rule average invocation time, for `Dispatcher::getStats` (§4.7).
    pub async fn stats(&self) -> HashMap<String, RuleTiming> {
        self.stats.lock().await.clone()
    }

    /// `max_rule_runners`, for computing pool utilization in
    /// `Dispatcher::getStats` (§4.7).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// In-flight invocations right now (`capacity - available permits`).
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
