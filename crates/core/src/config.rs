// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Recognized configuration keys (§6).

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_max_idle() -> u32 {
    20
}

/// The correlator's configuration, loaded from TOML. Fields beyond the ones
/// named in §6 (context-store endpoint, bus credentials, DB DSN) are kept as
/// opaque strings — their shape belongs to the external collaborators that
/// own them, not to this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Seconds; `<= 0` means "no timeout" (§6).
    #[serde(default)]
    pub rules_timeout: i64,
    pub min_rule_runners: u32,
    pub max_rule_runners: u32,
    #[serde(default = "default_max_idle")]
    pub rule_runners_max_idle: u32,
    /// Sentinel hostname for high-level-service carriers (§3, §6).
    pub nagios_hls_host: String,

    /// Opaque passthrough: context-store endpoint (memcached-class backend).
    #[serde(default)]
    pub context_store_endpoint: Option<String>,
    /// Opaque passthrough: bus connection credentials.
    #[serde(default)]
    pub bus_credentials: Option<toml::Value>,
    /// Opaque passthrough: relational database DSN.
    #[serde(default)]
    pub database_dsn: Option<String>,
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// `rules_timeout <= 0` means "no timeout" (§6); this converts that into
    /// `None` for callers that want a `Duration`.
    pub fn rules_timeout_duration(&self) -> Option<Duration> {
        if self.rules_timeout <= 0 {
            None
        } else {
            Some(Duration::from_secs(self.rules_timeout as u64))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::Config;

    pub fn minimal_config() -> Config {
        Config {
            rules_timeout: 30,
            min_rule_runners: 1,
            max_rule_runners: 4,
            rule_runners_max_idle: 20,
            nagios_hls_host: "hls-carrier".to_string(),
            context_store_endpoint: None,
            bus_credentials: None,
            database_dsn: None,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
