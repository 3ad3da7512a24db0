// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! `vigild`: the correlator daemon process (§6). Reads its configuration
//! from the path given as the first argument (default `vigil.toml`),
//! probes the database, and runs the Dispatcher until shut down.
//!
//! The bus transport and the concrete rule bodies registered with this
//! deployment are external collaborators (§1) this binary doesn't decide
//! on its own: it ships with [`vigil_adapters::LoggingBusAdapter`] and an
//! empty [`vigil_rules::RuleRegistry`] as defaults, the same way
//! `vigil-context`/`vigil-storage` ship in-process stand-ins for their own
//! external backends. A real deployment links in a concrete `BusAdapter`
//! and registers its rules before calling [`vigil_daemon::run`].

use std::env;
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use vigil_adapters::{connection_channel, LoggingBusAdapter};
use vigil_context::InMemoryContextStore;
use vigil_core::{Config, Topology};
use vigil_daemon::RunDeps;
use vigil_engine::EngineSettings;
use vigil_rules::RuleRegistry;
use vigil_storage::InMemoryStorageGateway;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            tracing::error!(error = %err, "failed to start the tokio runtime");
            return ExitCode::FAILURE;
        }
    };
    rt.block_on(run())
}

async fn run() -> ExitCode {
    let config_path = env::args().nth(1).unwrap_or_else(|| "vigil.toml".to_string());
    let config = match fs::read_to_string(&config_path).map_err(|e| e.to_string()).and_then(|raw| {
        Config::from_toml_str(&raw).map_err(|e| e.to_string())
    }) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(path = %config_path, error = %err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let storage: Arc<dyn vigil_storage::StorageGateway> = Arc::new(InMemoryStorageGateway::new());
    let context: Arc<dyn vigil_context::ContextStore> = Arc::new(InMemoryContextStore::new());
    let topology = Arc::new(Topology::new());
    let dag = match RuleRegistry::new().build_dag() {
        Ok(dag) => dag,
        Err(err) => {
            tracing::error!(error = %err, "failed to build the rule execution DAG");
            return ExitCode::FAILURE;
        }
    };
    let bus: Arc<dyn vigil_adapters::BusAdapter> = Arc::new(LoggingBusAdapter::new());
    let (_connection_handle, connection) = connection_channel(true);
    let settings = EngineSettings { nagios_hls_host: config.nagios_hls_host.clone(), hls_dependency_rule: None };

    let deps = RunDeps { storage, context, topology, dag, bus, connection, settings };

    let result = vigil_daemon::run(&config, deps).await;
    let code = vigil_daemon::exit_code_for(&result);
    if code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
