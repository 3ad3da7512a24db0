// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;

#[test]
fn parses_minimal_toml() {
    let toml = r#"
        min_rule_runners = 2
        max_rule_runners = 8
        nagios_hls_host = "hls-carrier"
    "#;
    let cfg = Config::from_toml_str(toml).unwrap();
    assert_eq!(cfg.min_rule_runners, 2);
    assert_eq!(cfg.max_rule_runners, 8);
    assert_eq!(cfg.rule_runners_max_idle, 20);
    assert_eq!(cfg.rules_timeout, 0);
    assert_eq!(cfg.nagios_hls_host, "hls-carrier");
}

#[test]
fn nonpositive_timeout_means_no_timeout() {
    let mut cfg = test_support::minimal_config();
    cfg.rules_timeout = 0;
    assert!(cfg.rules_timeout_duration().is_none());
    cfg.rules_timeout = -1;
    assert!(cfg.rules_timeout_duration().is_none());
}

#[test]
fn positive_timeout_converts_to_duration() {
    let mut cfg = test_support::minimal_config();
    cfg.rules_timeout = 30;
    assert_eq!(cfg.rules_timeout_duration(), Some(std::time::Duration::from_secs(30)));
}

#[test]
fn opaque_fields_round_trip_through_toml() {
    let toml = r#"
        min_rule_runners = 1
        max_rule_runners = 1
        nagios_hls_host = "hls"
        context_store_endpoint = "memcache://localhost:11211"
        database_dsn = "postgres://localhost/vigil"

        [bus_credentials]
        user = "vigil"
        password = "secret"
    "#;
    let cfg = Config::from_toml_str(toml).unwrap();
    assert_eq!(cfg.context_store_endpoint.as_deref(), Some("memcache://localhost:11211"));
    assert_eq!(cfg.database_dsn.as_deref(), Some("postgres://localhost/vigil"));
    assert!(cfg.bus_credentials.is_some());
}
