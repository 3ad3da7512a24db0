// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Computes the `predecessors_aggregates` / `successors_aggregates` /
//! `open_aggr:<id>` Context inputs the Correvent Manager's decision table
//! (§4.6) reads.
//!
//! §1 scopes individual correlation rules out of this core (they're
//! black boxes); but topological dependency analysis isn't a rule body in
//! the pluggable sense — it's the fixed, always-present logic the Correvent
//! Manager itself needs to classify a SupItem against the currently open
//! aggregates (see DESIGN.md). This module queries [`Topology`] and
//! [`StorageGateway`] directly and mirrors its findings into [`ContextStore`]
//! under the same keys a rule would use, so a registered black-box rule can
//! still observe or override them before the Correvent Manager runs.

use crate::EngineError;
use serde_json::json;
use vigil_context::ContextStore;
use vigil_core::{
    open_aggr_key, CorreventId, SupItemId, Topology, IDSUPITEM, PREDECESSORS_AGGREGATES,
    SUCCESSORS_AGGREGATES,
};
use vigil_storage::StorageGateway;

/// The three decisive inputs to §4.6's decision table for one SupItem.
#[derive(Debug, Clone, Default)]
pub struct DependencyResolution {
    /// Existing Correvents whose cause topologically precedes (is upstream
    /// of) this SupItem.
    pub predecessors: Vec<CorreventId>,
    /// Existing Correvents whose cause topologically depends on (is
    /// downstream of) this SupItem.
    pub successors: Vec<CorreventId>,
    /// The currently open Correvent rooted at this exact SupItem, if any.
    pub open_for_supitem: Option<CorreventId>,
}

/// Classify every currently open Correvent against `supitem_id`'s position
/// in `topology` (§4.6).
pub async fn resolve(
    storage: &dyn StorageGateway,
    topology: &Topology,
    supitem_id: SupItemId,
) -> Result<DependencyResolution, EngineError> {
    let open = storage.open_correvents().await?;
    let ancestors = topology.ancestors_with_distance(supitem_id);
    let descendants = topology.descendants(supitem_id);

    let mut resolution = DependencyResolution::default();
    for correvent in &open {
        let Some(cause_raw) = storage.get_raw_event(correvent.cause).await? else {
            continue;
        };
        let cause_supitem = cause_raw.supitem_id;
        if cause_supitem == supitem_id {
            resolution.open_for_supitem = Some(correvent.id);
            continue;
        }
        if ancestors.contains_key(&cause_supitem) {
            resolution.predecessors.push(correvent.id);
        }
        if descendants.contains(&cause_supitem) {
            resolution.successors.push(correvent.id);
        }
    }
    Ok(resolution)
}

/// [`resolve`], plus mirroring the result into `context` under the standard
/// keys (§3, §4.6) for any registered rule to observe.
pub async fn resolve_and_seed_context(
    storage: &dyn StorageGateway,
    topology: &Topology,
    context: &dyn ContextStore,
    message_id: &str,
    supitem_id: SupItemId,
) -> Result<DependencyResolution, EngineError> {
    let resolution = resolve(storage, topology, supitem_id).await?;

    context
        .set(message_id, PREDECESSORS_AGGREGATES, json!(ids(&resolution.predecessors)))
        .await?;
    context.set(message_id, SUCCESSORS_AGGREGATES, json!(ids(&resolution.successors))).await?;
    context.set(message_id, IDSUPITEM, json!(supitem_id.as_str())).await?;
    context
        .set_shared(
            &open_aggr_key(supitem_id),
            json!(resolution.open_for_supitem.map(|id| id.as_str().to_string()).unwrap_or_default()),
        )
        .await?;

    Ok(resolution)
}

fn ids(correvents: &[CorreventId]) -> Vec<&str> {
    correvents.iter().map(|id| id.as_str()).collect()
}

#[cfg(test)]
#[path = "dependency_resolver_tests.rs"]
mod tests;
