// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! `vigil`: the thin CLI wrapper around the daemon (§6). Exposes the single
//! `run` entry point the spec names; everything else (bus wiring, rule
//! registration) is the deployment's job, same split as `vigil-daemon`'s
//! own `vigild` binary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use vigil_adapters::{connection_channel, LoggingBusAdapter};
use vigil_context::InMemoryContextStore;
use vigil_core::{Config, Topology};
use vigil_daemon::RunDeps;
use vigil_engine::EngineSettings;
use vigil_rules::RuleRegistry;
use vigil_storage::InMemoryStorageGateway;

#[derive(Parser)]
#[command(name = "vigil", version, about = "Alert-correlation engine (§1-§9)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the correlator daemon until shut down (§6).
    Run {
        /// Path to the TOML configuration file (§6: recognized keys).
        #[arg(long, default_value = "vigil.toml")]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            tracing::error!(error = %err, "failed to start the tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Run { config } => rt.block_on(run(&config)),
    }
}

async fn run(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(path = %config_path.display(), error = %err, "failed to load configuration");
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
    match vigil_daemon::exit_code_for(&result) {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

fn load_config(path: &PathBuf) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path)?;
    Ok(Config::from_toml_str(&raw)?)
}
