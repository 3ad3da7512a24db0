// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Process wiring for the `vigild` binary (§6, §9 Design Note: "instantiate
//! a single `Engine` value owned by the top-level entry point; pass
//! explicitly to helpers — no process-wide globals").
//!
//! The bus transport, its connection-state driver, the relational store,
//! the context-store backend, the topology, and the registered rules are
//! all external collaborators or rule-agnostic inputs (§1); this module
//! only wires whatever concrete implementations the caller hands it into
//! one running [`Dispatcher`].

use std::sync::Arc;

use tracing::{error, info};
use vigil_adapters::{BusAdapter, ConnectionWatch};
use vigil_context::ContextStore;
use vigil_core::{Config, Topology};
use vigil_engine::{Engine, EngineSettings};
use vigil_rules::{RuleDag, RuleRunnerPool};
use vigil_storage::{DbError, StorageGateway};

use crate::Dispatcher;

/// Everything the caller must supply beyond [`Config`]: the concrete
/// external collaborators and the fixed rule DAG built from whatever rules
/// this deployment registers (§1: rules themselves are out of scope).
pub struct RunDeps {
    pub storage: Arc<dyn StorageGateway>,
    pub context: Arc<dyn ContextStore>,
    pub topology: Arc<Topology>,
    pub dag: RuleDag,
    pub bus: Arc<dyn BusAdapter>,
    /// Reflects the real bus connection's up/down state (§4.3, §5); the
    /// transport itself is out of this crate's scope, but the Dispatcher
    /// and Rule Runner Pool both need to observe its transitions.
    pub connection: ConnectionWatch,
    pub settings: EngineSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// §4.4: "On startup the Gateway issues a lightweight probe query; if
    /// it fails, the process aborts cleanly rather than looping on a dead
    /// database." §6: CLI exits non-zero on this.
    #[error("startup database probe failed: {0}")]
    Probe(#[from] DbError),
}

/// Run the daemon to completion: probe the database, build the Engine and
/// Dispatcher, start the pool-lifecycle/queue-drain background tasks, and
/// block until the connection watch is dropped (clean shutdown).
pub async fn run(config: &Config, deps: RunDeps) -> Result<(), RunError> {
    deps.storage.probe().await?;
    info!("startup database probe succeeded");

    let pool = Arc::new(RuleRunnerPool::new(config.max_rule_runners, config.rules_timeout_duration()));
    let engine = Arc::new(Engine::new(
        deps.storage.clone(),
        deps.context,
        deps.topology,
        deps.dag,
        pool.clone(),
        deps.settings,
    ));
    let dispatcher = Arc::new(Dispatcher::new(engine, deps.bus, deps.storage, deps.connection.clone()));

    let pool_lifecycle = tokio::spawn(run_pool_lifecycle(pool, deps.connection));

    // Blocks until the connection watch's sender is dropped, i.e. whatever
    // drives the real bus connection has shut down.
    dispatcher.run_drain_loop().await;

    pool_lifecycle.abort();
    info!("dispatcher drain loop exited, shutting down");
    Ok(())
}

/// Starts the rule runner pool when the bus connection becomes ready and
/// stops it on disconnect (§4.3, §5): "started when the bus connection
/// becomes ready; stopped on disconnect; restarted on reconnect."
async fn run_pool_lifecycle(pool: Arc<RuleRunnerPool>, mut connection: ConnectionWatch) {
    loop {
        if connection.is_connected() {
            pool.start();
        } else {
            pool.stop();
        }
        if !connection.changed().await {
            return;
        }
    }
}

/// Log a fatal startup error the way `vigild`'s binary entry point does,
/// then return the process exit code §6 requires (non-zero on probe
/// failure).
pub fn exit_code_for(result: &Result<(), RunError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            error!(error = %err, "daemon startup failed");
            1
        }
    }
}

#[cfg(test)]
#[path = "wiring_tests.rs"]
mod tests;
