// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The Dispatcher (§4.7): the top-level orchestrator. Exposes `forward` to
//! external consumers, maintains the FIFO retry queue, republishes the
//! post-correlation state and correvent notification for every
//! successfully processed event, and reports `getStats()`.
//!
//! Connection lifecycle (§4.3, §5): on `connectionInitialized` the rule
//! runner pool starts and draining resumes; on `connectionLost` the pool
//! stops and draining pauses. The queue itself is in-memory only — the bus
//! is the durable source of truth (§4.7).

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info, warn};
use vigil_adapters::{BusAdapter, ConnectionWatch};
use vigil_core::{Classify, RawEventId};
use vigil_engine::{CorreventAction, DropReason, Engine, ProcessOutcome};
use vigil_rules::{RuleRunnerPool, RuleTiming};
use vigil_storage::StorageGateway;
use vigil_wire::{encode_correvent_notification, encode_state_update, CorreventNotification, StateUpdate};

use crate::DispatchError;

/// Snapshot returned by `getStats()` (§4.7): per-rule timing averages, the
/// Dispatcher's own total-correlation-time average, the retry queue's
/// current depth, and how much of the rule runner pool's capacity is busy.
#[derive(Debug, Clone, Default)]
pub struct DispatchStats {
    pub rule_timings: std::collections::HashMap<String, Duration>,
    pub average_correlation_time: Duration,
    pub queue_depth: usize,
    pub pool_utilization: f64,
}

/// The Dispatcher (§4.7): one instance per daemon process, owning the
/// Engine, the bus adapter, the retry queue, and connection-lifecycle
/// bookkeeping.
pub struct Dispatcher {
    engine: Arc<Engine>,
    bus: Arc<dyn BusAdapter>,
    storage: Arc<dyn StorageGateway>,
    pool: Arc<RuleRunnerPool>,
    connection: ConnectionWatch,
    queue: AsyncMutex<VecDeque<String>>,
    correlation_timing: AsyncMutex<RuleTiming>,
}

impl Dispatcher {
    pub fn new(
        engine: Arc<Engine>,
        bus: Arc<dyn BusAdapter>,
        storage: Arc<dyn StorageGateway>,
        connection: ConnectionWatch,
    ) -> Self {
        let pool = engine.pool().clone();
        Self {
            engine,
            bus,
            storage,
            pool,
            connection,
            queue: AsyncMutex::new(VecDeque::new()),
            correlation_timing: AsyncMutex::new(RuleTiming::default()),
        }
    }

    /// Process one inbound bus item end to end (§4.7): run the pipeline,
    /// republish its results, and classify any error per §7's propagation
    /// policy. Transient errors append `raw_xml` to the retry queue instead
    /// of surfacing past this call — the message is never lost, only
    /// delayed (§4.7, §7).
    pub async fn forward(&self, raw_xml: &str) {
        match self.run_once(raw_xml).await {
            Ok(()) => {}
            Err(err) if err.class().is_transient() => {
                warn!(error = %err, "transient error, re-enqueueing message");
                self.enqueue(raw_xml).await;
            }
            Err(err) => {
                // Permanent/rule-failure errors: logged and dropped so a
                // poison message can't loop the retry queue forever (§7).
                error!(error = %err, "dropping message after permanent error");
            }
        }
    }

    async fn run_once(&self, raw_xml: &str) -> Result<(), DispatchError> {
        if !self.pool.is_running() {
            return Err(DispatchError::PoolStopped);
        }

        let started = Instant::now();
        let outcome = self.engine.process(raw_xml).await?;
        self.record_correlation_time(started.elapsed()).await;

        match outcome {
            ProcessOutcome::Dropped(DropReason::Stale) => {
                info!("stale event dropped (OldStateReceived)");
            }
            ProcessOutcome::Dropped(DropReason::NoProblem) => {
                info!("nominal event with no open correvent short-circuited (NoProblem)");
            }
            ProcessOutcome::Dropped(DropReason::Other) => {
                info!("out-of-scope bus item ignored");
            }
            ProcessOutcome::TicketApplied => {
                info!("ticket payload applied");
            }
            ProcessOutcome::ComputationOrderHandled { impacted_hls } => {
                info!(count = impacted_hls.len(), "computation order dispatched to HLS rule");
            }
            ProcessOutcome::Correlated { message_id, ingested, correvent, .. } => {
                self.publish_results(&message_id, &ingested, correvent).await?;
            }
        }

        Ok(())
    }

    /// Republish the post-correlation state, and — unless the event
    /// targeted the HLS sentinel — a correvent notification (§4.7).
    async fn publish_results(
        &self,
        message_id: &str,
        ingested: &vigil_engine::EventIngest,
        action: CorreventAction,
    ) -> Result<(), DispatchError> {
        let state_update = encode_state_update(&StateUpdate {
            message_id,
            host: ingested.host.as_deref(),
            service: ingested.service.as_deref(),
            state: ingested.state,
            timestamp: ingested.timestamp,
            message: &ingested.message,
        });
        self.bus.publish(&state_update).await?;

        if ingested.is_hls {
            return Ok(());
        }

        self.publish_correvent_notification(message_id, action.correvent_id()).await
    }

    async fn publish_correvent_notification(
        &self,
        message_id: &str,
        correvent_id: vigil_core::CorreventId,
    ) -> Result<(), DispatchError> {
        let Some(correvent) = self.storage.get_correvent(correvent_id).await? else {
            // Resolved-and-vanished between the decision and here shouldn't
            // happen (the engine never deletes on resolve, §3) but a
            // vanished aggregate simply has nothing left to announce.
            return Ok(());
        };

        let (cause_host, cause_service) = self.cause_location(correvent.cause).await?;
        let members: Vec<RawEventId> = correvent.members.iter().copied().collect();

        let notification = encode_correvent_notification(&CorreventNotification {
            message_id,
            correvent_id: correvent.id.as_str(),
            cause_host: cause_host.as_deref(),
            cause_service: cause_service.as_deref(),
            priority: correvent.priority,
            ack: correvent.ack,
            members: &members,
        });
        self.bus.publish(&notification).await?;
        Ok(())
    }

    async fn cause_location(
        &self,
        cause: RawEventId,
    ) -> Result<(Option<String>, Option<String>), DispatchError> {
        let Some(raw) = self.storage.get_raw_event(cause).await? else {
            return Ok((None, None));
        };
        let Some(supitem) = self.storage.get_supitem(raw.supitem_id).await? else {
            return Ok((None, None));
        };
        Ok((supitem.host, supitem.service))
    }

    async fn record_correlation_time(&self, elapsed: Duration) {
        let mut timing = self.correlation_timing.lock().await;
        timing.count += 1;
        timing.total += elapsed;
    }

    async fn enqueue(&self, raw_xml: &str) {
        self.queue.lock().await.push_back(raw_xml.to_string());
    }

    pub async fn queue_depth(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Drain the retry queue once, forwarding each entry again. Stops as
    /// soon as the connection drops or the queue empties — a background
    /// task (`run_drain_loop`) calls this repeatedly while connected.
    pub async fn drain_once(&self) {
        loop {
            if !self.connection.is_connected() {
                return;
            }
            let Some(raw_xml) = self.queue.lock().await.pop_front() else { return };
            self.forward(&raw_xml).await;
        }
    }

    /// Runs until the connection watch is dropped (process shutdown):
    /// drains the queue whenever connected, and pauses while disconnected
    /// (§4.3, §4.7). Intended to be spawned as a background task alongside
    /// whatever drives the real bus connection.
    pub async fn run_drain_loop(&self) {
        let mut connection = self.connection.clone();
        loop {
            if connection.is_connected() {
                self.drain_once().await;
            }
            if !connection.changed().await {
                // Watch sender dropped: no further connection transitions
                // will ever arrive.
                return;
            }
        }
    }

    /// `getStats()` (§4.7): per-rule timing averages, the Dispatcher's own
    /// total correlation-time average, queue depth, and pool utilization.
    pub async fn stats(&self) -> DispatchStats {
        let pool_stats = self.pool.stats().await;
        let rule_timings =
            pool_stats.into_iter().map(|(name, timing)| (name, timing.average())).collect();

        let correlation_timing = self.correlation_timing.lock().await;
        let average_correlation_time = correlation_timing.average();
        drop(correlation_timing);

        let capacity = self.pool.capacity().max(1) as f64;
        let pool_utilization = self.pool.in_flight() as f64 / capacity;

        DispatchStats {
            rule_timings,
            average_correlation_time,
            queue_depth: self.queue_depth().await,
            pool_utilization,
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
