// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! End-to-end scenarios (§8) driven through the full pipeline: decoded XML
//! bus items, the Engine's ingest/DAG/Correvent-Manager pipeline, and —
//! where the scenario cares about what goes back out — the Dispatcher's
//! republication through a [`BusAdapter`].
//!
//! A few scenarios (S2-S4, S6) assert on Correvent membership and Executor
//! results directly against the storage gateway and [`ProcessOutcome`]
//! rather than through the Dispatcher, since that's where the pipeline
//! exposes the detail these scenarios are actually about.

use std::sync::Arc;
use std::time::Duration;

use vigil_adapters::test_support::InMemoryBusAdapter;
use vigil_adapters::{connection_channel, ConnectionHandle};
use vigil_context::{ContextStore, InMemoryContextStore};
use vigil_core::{DependencyGroup, SupItemId, Topology};
use vigil_daemon::Dispatcher;
use vigil_engine::{CorreventAction, DropReason, Engine, EngineSettings, ProcessOutcome};
use vigil_rules::test_support::FakeRule;
use vigil_rules::{RuleError, RuleRegistry, RuleRunnerPool};
use vigil_storage::{InMemoryStorageGateway, StorageGateway};

fn event_xml(id: &str, host: &str, state: &str, timestamp: i64) -> String {
    format!(
        r#"<item id="{id}"><event xmlns="urn:vigil:event">
            <timestamp>{timestamp}</timestamp>
            <host>{host}</host>
            <state>{state}</state>
            <message>m</message>
        </event></item>"#
    )
}

fn engine(storage: Arc<dyn StorageGateway>, topology: Topology) -> Engine {
    let context: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::new());
    let dag = RuleRegistry::new().build_dag().unwrap();
    let pool = Arc::new(RuleRunnerPool::new(4, Some(Duration::from_secs(1))));
    pool.start();
    let settings = EngineSettings { nagios_hls_host: "nagios-hls".to_string(), hls_dependency_rule: None };
    Engine::new(storage, context, Arc::new(topology), dag, pool, settings)
}

/// A Dispatcher-backed harness for scenarios that care about bus
/// republication, not just storage-level correctness.
struct Harness {
    dispatcher: Dispatcher,
    bus: Arc<InMemoryBusAdapter>,
    storage: Arc<dyn StorageGateway>,
    _connection: ConnectionHandle,
}

fn build_harness() -> Harness {
    let storage: Arc<dyn StorageGateway> = Arc::new(InMemoryStorageGateway::new());
    let engine = Arc::new(engine(storage.clone(), Topology::new()));
    let bus = Arc::new(InMemoryBusAdapter::new());
    let (handle, watch) = connection_channel(true);
    let dispatcher = Dispatcher::new(engine, bus.clone(), storage.clone(), watch);
    Harness { dispatcher, bus, storage, _connection: handle }
}

/// S1: a single, dependency-free host going down then up creates and then
/// desaggregates exactly one Correvent, publishing a state update and a
/// correvent notification both times.
#[tokio::test]
async fn s1_single_host_down_then_up() {
    let harness = build_harness();
    let h1 = harness.storage.get_or_create_supitem(Some("h1"), None).await.unwrap();

    harness.dispatcher.forward(&event_xml("m-1", "h1", "DOWN", 1)).await;

    let open = harness.storage.open_correvent_for_supitem(h1.id).await.unwrap().unwrap();
    assert_eq!(open.members.len(), 1);
    let published = harness.bus.published();
    assert_eq!(published.len(), 2);
    assert!(published[1].contains("<correlated_event"));

    harness.dispatcher.forward(&event_xml("m-2", "h1", "UP", 2)).await;

    assert!(harness.storage.open_correvent_for_supitem(h1.id).await.unwrap().is_none());
    let resolved = harness.storage.get_correvent(open.id).await.unwrap().unwrap();
    assert!(resolved.resolved);
    assert_eq!(resolved.members.len(), 1);
    assert_eq!(harness.bus.published().len(), 4);
}

/// S2: topology promotion. H2 -> H1, H4 -> H1, H3 -> H4 -> H1 (`->` reads
/// "depends on"). A downstream problem first roots its own aggregate; the
/// upstream root then reopens and absorbs it; every further downstream
/// problem simply joins the standing root.
#[tokio::test]
async fn s2_topology_promotion() {
    let storage: Arc<dyn StorageGateway> = Arc::new(InMemoryStorageGateway::new());
    let h1 = storage.get_or_create_supitem(Some("h1"), None).await.unwrap();
    let h2 = storage.get_or_create_supitem(Some("h2"), None).await.unwrap();
    let h3 = storage.get_or_create_supitem(Some("h3"), None).await.unwrap();
    let h4 = storage.get_or_create_supitem(Some("h4"), None).await.unwrap();

    let mut topology = Topology::new();
    topology.add_group(
        DependencyGroup::new("g")
            .with_dependency(h2.id, h1.id, 1)
            .with_dependency(h4.id, h1.id, 1)
            .with_dependency(h3.id, h4.id, 1),
    );
    let engine = engine(storage.clone(), topology);

    let c1 = match engine.process(&event_xml("m-1", "h2", "UNREACHABLE", 1)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::Created(id), .. } => id,
        other => panic!("expected Created, got {other:?}"),
    };
    assert_eq!(storage.get_correvent(c1).await.unwrap().unwrap().members.len(), 1);

    let c2 = match engine.process(&event_xml("m-2", "h1", "DOWN", 2)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::ReopenedAndMerged(id), .. } => id,
        other => panic!("expected ReopenedAndMerged, got {other:?}"),
    };
    assert!(storage.get_correvent(c1).await.unwrap().is_none());
    assert_eq!(storage.get_correvent(c2).await.unwrap().unwrap().members.len(), 2);

    match engine.process(&event_xml("m-3", "h4", "UNREACHABLE", 3)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::JoinedPredecessor(id), .. } => {
            assert_eq!(id, c2);
        }
        other => panic!("expected JoinedPredecessor, got {other:?}"),
    }
    assert_eq!(storage.get_correvent(c2).await.unwrap().unwrap().members.len(), 3);

    match engine.process(&event_xml("m-4", "h3", "UNREACHABLE", 4)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::JoinedPredecessor(id), .. } => {
            assert_eq!(id, c2);
        }
        other => panic!("expected JoinedPredecessor, got {other:?}"),
    }
    let root = storage.get_correvent(c2).await.unwrap().unwrap();
    assert_eq!(root.members.len(), 4);
    assert!(root.members.iter().any(|m| storage.get_raw_event(*m).await.unwrap().unwrap().supitem_id == h3.id));
}

/// S3: desaggregation with an intermediate root. Continuing S2's topology,
/// H1 recovering desaggregates the standing root. H2 (a direct dependent of
/// H1, still UNREACHABLE, with no other still-problematic ancestor) roots a
/// trivial aggregate of its own; H3 re-homes onto H4, rooting a fresh
/// aggregate there since H4 had never opened one of its own.
#[tokio::test]
async fn s3_desaggregation_with_intermediate_root() {
    let storage: Arc<dyn StorageGateway> = Arc::new(InMemoryStorageGateway::new());
    let h1 = storage.get_or_create_supitem(Some("h1"), None).await.unwrap();
    let h2 = storage.get_or_create_supitem(Some("h2"), None).await.unwrap();
    let h3 = storage.get_or_create_supitem(Some("h3"), None).await.unwrap();
    let h4 = storage.get_or_create_supitem(Some("h4"), None).await.unwrap();

    let mut topology = Topology::new();
    topology.add_group(
        DependencyGroup::new("g")
            .with_dependency(h2.id, h1.id, 1)
            .with_dependency(h4.id, h1.id, 1)
            .with_dependency(h3.id, h4.id, 1),
    );
    let engine = engine(storage.clone(), topology);

    engine.process(&event_xml("m-1", "h2", "UNREACHABLE", 1)).await.unwrap();
    let root = match engine.process(&event_xml("m-2", "h1", "DOWN", 2)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::ReopenedAndMerged(id), .. } => id,
        other => panic!("expected ReopenedAndMerged, got {other:?}"),
    };
    engine.process(&event_xml("m-3", "h4", "UNREACHABLE", 3)).await.unwrap();
    engine.process(&event_xml("m-4", "h3", "UNREACHABLE", 4)).await.unwrap();
    assert_eq!(storage.get_correvent(root).await.unwrap().unwrap().members.len(), 4);

    match engine.process(&event_xml("m-5", "h1", "UP", 5)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::Desaggregated(id), .. } => {
            assert_eq!(id, root)
        }
        other => panic!("expected Desaggregated, got {other:?}"),
    }

    let resolved_root = storage.get_correvent(root).await.unwrap().unwrap();
    assert!(resolved_root.resolved);
    assert_eq!(resolved_root.members.len(), 1);

    // H2 has no other ancestor still down but is still UNREACHABLE itself:
    // it roots a trivial aggregate of its own (§8 scenario S3).
    let h2_root = storage.open_correvent_for_supitem(h2.id).await.unwrap().unwrap();
    assert!(h2_root.members.iter().any(|m| storage.get_raw_event(*m).await.unwrap().unwrap().supitem_id == h2.id));

    // H3's nearest surviving problem ancestor is H4; since H4 never had its
    // own aggregate, one is created rooted at H4 and H3 joins it.
    let h4_root = storage.open_correvent_for_supitem(h4.id).await.unwrap().unwrap();
    assert!(h4_root.members.iter().any(|m| storage.get_raw_event(*m).await.unwrap().unwrap().supitem_id == h3.id));
}

/// S4: a diamond dependency (H3 depends independently on both H1 and H2).
/// H3's single problem event joins BOTH standing aggregates as a member
/// (§4.6 "Triangle / diamond topology"); when one ancestor's aggregate
/// recovers, H3 is removed from that one only and stays a member of the
/// surviving one rather than being left behind.
#[tokio::test]
async fn s4_diamond_topology() {
    let storage: Arc<dyn StorageGateway> = Arc::new(InMemoryStorageGateway::new());
    let h1 = storage.get_or_create_supitem(Some("h1"), None).await.unwrap();
    let h2 = storage.get_or_create_supitem(Some("h2"), None).await.unwrap();
    let h3 = storage.get_or_create_supitem(Some("h3"), None).await.unwrap();

    let mut topology = Topology::new();
    topology.add_group(
        DependencyGroup::new("g").with_dependency(h3.id, h1.id, 1).with_dependency(h3.id, h2.id, 1),
    );
    let engine = engine(storage.clone(), topology);

    let c1 = match engine.process(&event_xml("m-1", "h1", "DOWN", 1)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::Created(id), .. } => id,
        other => panic!("expected Created, got {other:?}"),
    };
    let c2 = match engine.process(&event_xml("m-2", "h2", "DOWN", 2)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::Created(id), .. } => id,
        other => panic!("expected Created, got {other:?}"),
    };

    let joined = match engine.process(&event_xml("m-3", "h3", "UNREACHABLE", 3)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::JoinedPredecessor(id), .. } => id,
        other => panic!("expected JoinedPredecessor, got {other:?}"),
    };
    assert!(joined == c1 || joined == c2);
    let surviving = if joined == c1 { c2 } else { c1 };
    let recovering_host = if joined == c1 { "h1" } else { "h2" };

    // H3 is a member of BOTH standing aggregates, not just the one the
    // resolver happened to report first.
    let agg1 = storage.get_correvent(c1).await.unwrap().unwrap();
    let agg2 = storage.get_correvent(c2).await.unwrap().unwrap();
    assert!(agg1.members.iter().any(|m| storage.get_raw_event(*m).await.unwrap().unwrap().supitem_id == h3.id));
    assert!(agg2.members.iter().any(|m| storage.get_raw_event(*m).await.unwrap().unwrap().supitem_id == h3.id));

    match engine.process(&event_xml("m-4", recovering_host, "UP", 4)).await.unwrap() {
        ProcessOutcome::Correlated { correvent: CorreventAction::Desaggregated(id), .. } => {
            assert_eq!(id, joined)
        }
        other => panic!("expected Desaggregated, got {other:?}"),
    }

    // H3 migrated onto the surviving aggregate since it's still a problem.
    let survivor = storage.get_correvent(surviving).await.unwrap().unwrap();
    assert!(survivor.members.iter().any(|m| storage.get_raw_event(*m).await.unwrap().unwrap().supitem_id == h3.id));
}

/// S5: an out-of-order ("old") state is dropped without mutating anything —
/// the standing Correvent from the later timestamp is untouched.
#[tokio::test]
async fn s5_old_state_is_ignored() {
    let harness = build_harness();
    let h1 = harness.storage.get_or_create_supitem(Some("h1"), None).await.unwrap();

    harness.dispatcher.forward(&event_xml("m-1", "h1", "DOWN", 10)).await;
    let open_before = harness.storage.open_correvent_for_supitem(h1.id).await.unwrap().unwrap();

    harness.dispatcher.forward(&event_xml("m-2", "h1", "UP", 5)).await;

    let open_after = harness.storage.open_correvent_for_supitem(h1.id).await.unwrap().unwrap();
    assert_eq!(open_before, open_after);
    // Only the first message's state + correvent notification were ever
    // published; the stale second message produced nothing.
    assert_eq!(harness.bus.published().len(), 2);
}

/// S6: a rule that overruns `rules_timeout` still lets the pipeline
/// complete — the Correvent is created from the partial Context, and the
/// timeout surfaces as that rule's own result rather than failing the
/// message (Design Note 9(a): partial-success default for non-mandatory
/// rules).
#[tokio::test]
async fn s6_rule_timeout_still_correlates() {
    let storage: Arc<dyn StorageGateway> = Arc::new(InMemoryStorageGateway::new());
    let context: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::new());
    let mut registry = RuleRegistry::new();
    registry.register(Arc::new(FakeRule::new("slow").sleeping(Duration::from_millis(200)))).unwrap();
    let dag = registry.build_dag().unwrap();
    let pool = Arc::new(RuleRunnerPool::new(4, Some(Duration::from_millis(20))));
    pool.start();
    let settings = EngineSettings { nagios_hls_host: "nagios-hls".to_string(), hls_dependency_rule: None };
    let engine = Engine::new(storage, context, Arc::new(Topology::new()), dag, pool, settings);

    let outcome = engine.process(&event_xml("m-1", "h1", "DOWN", 1)).await.unwrap();
    match outcome {
        ProcessOutcome::Correlated { executor, correvent, .. } => {
            assert!(!executor.short_circuited);
            match executor.results.get("slow") {
                Some(Err(RuleError::Timeout { rule })) => assert_eq!(rule, "slow"),
                other => panic!("expected a recorded timeout, got {other:?}"),
            }
            assert!(matches!(correvent, CorreventAction::Created(_)));
        }
        other => panic!("expected Correlated, got {other:?}"),
    }
}

/// Dropped/stale/no-problem classification is exercised end to end through
/// the Dispatcher too, not just the Engine (§4.5, §4.7): a nominal state
/// with nothing open publishes nothing at all.
#[tokio::test]
async fn nominal_state_with_nothing_open_publishes_nothing() {
    let harness = build_harness();

    harness.dispatcher.forward(&event_xml("m-1", "h1", "UP", 1)).await;

    assert!(harness.bus.published().is_empty());
}

/// P1/P2/P4 (§8) hold across arbitrary down/up sequences on independent
/// hosts: every live Correvent's cause is one of its own members, and a
/// Correvent only stays live while its cause SupItem is still a problem.
mod properties {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Down(u8),
        Up(u8),
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        (0u8..3, any::<bool>())
            .prop_map(|(host, down)| if down { Step::Down(host) } else { Step::Up(host) })
    }

    proptest! {
        #[test]
        fn cause_is_always_a_member_and_live_only_while_problem(steps in prop::collection::vec(step_strategy(), 0..30)) {
            tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
                let storage: Arc<dyn StorageGateway> = Arc::new(InMemoryStorageGateway::new());
                let supitems: Vec<SupItemId> = {
                    let mut ids = Vec::new();
                    for host in ["h0", "h1", "h2"] {
                        ids.push(storage.get_or_create_supitem(Some(host), None).await.unwrap().id);
                    }
                    ids
                };
                let engine = engine(storage.clone(), Topology::new());

                for (i, step) in steps.into_iter().enumerate() {
                    let (host_idx, state) = match step {
                        Step::Down(h) => (h, "DOWN"),
                        Step::Up(h) => (h, "UP"),
                    };
                    let host = format!("h{}", host_idx % 3);
                    let xml = event_xml(&format!("m-{i}"), &host, state, i as i64);
                    let _ = engine.process(&xml).await;
                }

                let problems = storage.problem_supitems().await.unwrap();
                for correvent in storage.open_correvents().await.unwrap() {
                    prop_assert!(correvent.members.contains(&correvent.cause));
                    let cause_supitem = storage.get_raw_event(correvent.cause).await.unwrap().unwrap().supitem_id;
                    prop_assert!(problems.contains(&cause_supitem));
                    prop_assert!(supitems.contains(&cause_supitem));
                }
                Ok(())
            })?;
        }
    }
}
