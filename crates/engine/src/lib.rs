// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The correlation engine: wires the Event Ingestor / State-History Writer
//! (§4.5), Executor (§4.2), and Correvent Manager (§4.6) into the single
//! entry point a Dispatcher (`vigil-daemon`) drives per inbound bus item.

mod context_adapter;
mod correvent_manager;
mod dependency_resolver;
mod error;
mod executor;
mod ingestor;

pub use context_adapter::ScopedRuleContext;
pub use correvent_manager::{CorreventAction, CorreventManager};
pub use dependency_resolver::{resolve, resolve_and_seed_context, DependencyResolution};
pub use error::EngineError;
pub use executor::{run_dag, ExecutorReport};
pub use ingestor::{ingest, EventIngest, IngestOutcome};

use std::sync::Arc;
use vigil_context::ContextStore;
use vigil_core::Topology;
use vigil_rules::{Rule, RuleContext, RuleDag, RuleRunnerPool};
use vigil_storage::StorageGateway;

/// Why a message's pipeline ended without running any rules (§4.5, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// `OldStateReceived`: the incoming timestamp was older than what's on
    /// record.
    Stale,
    /// `NoProblemException`: a nominal state with no open Correvent.
    NoProblem,
    /// A recognized-but-out-of-scope bus item.
    Other,
}

/// What `Engine::process` did with one decoded bus item.
#[derive(Debug)]
pub enum ProcessOutcome {
    Dropped(DropReason),
    /// A `Ticket` payload was applied to the correvent currently open for
    /// its SupItem, if any; no rules run (§4.5).
    TicketApplied,
    /// A `ComputationOrder` was dispatched directly to the registered
    /// HLS-dependency rule, bypassing the rule DAG (§4.5).
    ComputationOrderHandled { impacted_hls: Vec<String> },
    /// An `Event` payload ran the full pipeline: state/history write, rule
    /// DAG, and Correvent Manager decision.
    Correlated {
        message_id: String,
        ingested: EventIngest,
        executor: ExecutorReport,
        correvent: CorreventAction,
    },
}

/// Configuration the engine needs beyond the shared [`vigil_core::Config`]
/// (§6): which hostname is the HLS sentinel, and which registered rule
/// handles `ComputationOrder` items.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub nagios_hls_host: String,
    pub hls_dependency_rule: Option<String>,
}

/// The correlation engine (§4): one instance per daemon process, shared
/// across every concurrently-processed message (Design Note, §5).
pub struct Engine {
    storage: Arc<dyn StorageGateway>,
    context: Arc<dyn ContextStore>,
    topology: Arc<Topology>,
    dag: RuleDag,
    pool: Arc<RuleRunnerPool>,
    correvent_manager: CorreventManager,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(
        storage: Arc<dyn StorageGateway>,
        context: Arc<dyn ContextStore>,
        topology: Arc<Topology>,
        dag: RuleDag,
        pool: Arc<RuleRunnerPool>,
        settings: EngineSettings,
    ) -> Self {
        let correvent_manager = CorreventManager::new(storage.clone(), topology.clone());
        Self { storage, context, topology, dag, pool, correvent_manager, settings }
    }

    pub fn pool(&self) -> &Arc<RuleRunnerPool> {
        &self.pool
    }

    /// Run the full pipeline for one decoded-from-XML bus item (§4.5 → §4.2
    /// → §4.6). `raw_xml` is the serialized payload root element forwarded
    /// verbatim to rule bodies (Design Note 9).
    pub async fn process(&self, raw_xml: &str) -> Result<ProcessOutcome, EngineError> {
        let message = vigil_wire::decode_item(raw_xml)?;
        let message_id = message.id.as_str().to_string();

        let outcome = ingest(
            self.storage.as_ref(),
            self.context.as_ref(),
            &message_id,
            &message.payload,
            &self.settings.nagios_hls_host,
        )
        .await?;

        match outcome {
            IngestOutcome::Stale => Ok(ProcessOutcome::Dropped(DropReason::Stale)),
            IngestOutcome::NoProblem => {
                self.context.expire(&message_id).await?;
                Ok(ProcessOutcome::Dropped(DropReason::NoProblem))
            }
            IngestOutcome::Other => Ok(ProcessOutcome::Dropped(DropReason::Other)),
            IngestOutcome::Ticket => Ok(ProcessOutcome::TicketApplied),
            IngestOutcome::ComputationOrder { impacted_hls } => {
                self.dispatch_computation_order(&message_id, raw_xml).await?;
                Ok(ProcessOutcome::ComputationOrderHandled { impacted_hls })
            }
            IngestOutcome::Event(ingested) => {
                self.run_correlation(&message_id, raw_xml, ingested).await
            }
        }
    }

    async fn dispatch_computation_order(
        &self,
        message_id: &str,
        raw_xml: &str,
    ) -> Result<(), EngineError> {
        let rule_name = self
            .settings
            .hls_dependency_rule
            .as_deref()
            .ok_or(EngineError::HlsRuleNotRegistered)?;
        let rule = self
            .dag
            .index_of(rule_name)
            .map(|idx| self.dag.rule_at(idx).clone())
            .ok_or(EngineError::HlsRuleNotRegistered)?;

        let ctx: Arc<dyn RuleContext> =
            Arc::new(ScopedRuleContext::new(self.context.clone(), message_id.to_string()));
        rule.run(ctx.as_ref(), message_id, raw_xml).await?;
        self.context.expire(message_id).await?;
        Ok(())
    }

    async fn run_correlation(
        &self,
        message_id: &str,
        raw_xml: &str,
        ingested: EventIngest,
    ) -> Result<ProcessOutcome, EngineError> {
        // Seed predecessors/successors into Context before the DAG runs so a
        // registered rule can read (or override) them (§4.6).
        if ingested.state.is_problem() {
            resolve_and_seed_context(
                self.storage.as_ref(),
                &self.topology,
                self.context.as_ref(),
                message_id,
                ingested.supitem_id,
            )
            .await?;
        }

        let ctx: Arc<dyn RuleContext> =
            Arc::new(ScopedRuleContext::new(self.context.clone(), message_id.to_string()));
        let executor_report = run_dag(
            &self.dag,
            self.pool.clone(),
            ctx,
            Arc::from(message_id),
            Arc::from(raw_xml),
        )
        .await?;

        let correvent = self.correvent_manager.apply(self.context.as_ref(), message_id, &ingested).await?;
        self.context.expire(message_id).await?;

        Ok(ProcessOutcome::Correlated {
            message_id: message_id.to_string(),
            ingested,
            executor: executor_report,
            correvent,
        })
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
