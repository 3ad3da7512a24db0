// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The Correvent Manager (§4.6): decides whether an ingested problem event
//! joins an existing aggregate, roots a new one, or triggers a merge; and
//! desaggregates members off an aggregate whose cause has returned nominal.
//!
//! §5 describes a per-SupItem partitioned optimistic-locking scheme for
//! concurrent access to this decision table. We stand in a single
//! process-wide `tokio::sync::Mutex` guarding the whole transition instead
//! (see DESIGN.md) — correct, just not partitioned, since partitioning the
//! lock is an implementation-scaling concern out of this core's scope (§5).

use crate::dependency_resolver::{self, DependencyResolution};
use crate::ingestor::EventIngest;
use crate::EngineError;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use vigil_context::ContextStore;
use vigil_core::{
    open_aggr_key, CorreventId, RawEventId, SupItemId, Topology, PREDECESSORS_AGGREGATES,
    SUCCESSORS_AGGREGATES,
};
use vigil_storage::StorageGateway;

/// What the Correvent Manager did with one ingested problem event (§4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorreventAction {
    /// A brand new aggregate was created, rooted at the ingested event.
    Created(CorreventId),
    /// The event joined an aggregate already open for an ancestor.
    JoinedPredecessor(CorreventId),
    /// The event's own aggregate was reopened (it had previously resolved)
    /// and merged with aggregates rooted at any of its problem descendants.
    ReopenedAndMerged(CorreventId),
    /// A recurrence against an aggregate already open for this exact
    /// SupItem: occurrence bumped, no membership change.
    Recurred(CorreventId),
    /// The cause SupItem returned to a nominal state: its aggregate was
    /// desaggregated, freeing every non-cause member onto its nearest
    /// still-problematic ancestor (or leaving it homeless if none exists).
    Desaggregated(CorreventId),
}

impl CorreventAction {
    /// The Correvent this action touched, regardless of variant — used by
    /// the Dispatcher to look up the aggregate to republish (§4.7).
    pub fn correvent_id(&self) -> CorreventId {
        match self {
            CorreventAction::Created(id)
            | CorreventAction::JoinedPredecessor(id)
            | CorreventAction::ReopenedAndMerged(id)
            | CorreventAction::Recurred(id)
            | CorreventAction::Desaggregated(id) => *id,
        }
    }
}

pub struct CorreventManager {
    storage: Arc<dyn StorageGateway>,
    topology: Arc<Topology>,
    lock: Mutex<()>,
}

impl CorreventManager {
    pub fn new(storage: Arc<dyn StorageGateway>, topology: Arc<Topology>) -> Self {
        Self { storage, topology, lock: Mutex::new(()) }
    }

    /// Apply the ingested event's state to the aggregate model (§4.6).
    ///
    /// `ingest` already wrote the RawEvent and history rows (§4.5); this
    /// method only manages Correvent membership.
    pub async fn apply(
        &self,
        context: &dyn ContextStore,
        message_id: &str,
        ingested: &EventIngest,
    ) -> Result<CorreventAction, EngineError> {
        let _guard = self.lock.lock().await;

        if ingested.state.is_nominal() {
            return self.desaggregate(ingested.supitem_id).await;
        }

        let resolution = self.read_or_resolve(context, message_id, ingested.supitem_id).await?;

        self.apply_problem(ingested.raw_event_id, ingested.timestamp, resolution).await
    }

    /// `ingest`/`run_correlation` already seeded `predecessors_aggregates` /
    /// `successors_aggregates` / `open_aggr:<id>` into Context before the
    /// rule DAG ran (§4.6), specifically so a registered rule can observe or
    /// override them. Read those keys back here rather than recomputing —
    /// recomputing would silently discard any rule's override. Only if the
    /// keys were never seeded at all (a caller that skips the pre-DAG seed
    /// step) do we fall back to resolving fresh.
    async fn read_or_resolve(
        &self,
        context: &dyn ContextStore,
        message_id: &str,
        supitem_id: SupItemId,
    ) -> Result<DependencyResolution, EngineError> {
        let predecessors = context.get(message_id, PREDECESSORS_AGGREGATES).await?;
        let successors = context.get(message_id, SUCCESSORS_AGGREGATES).await?;

        let (Some(predecessors), Some(successors)) = (predecessors, successors) else {
            return dependency_resolver::resolve(self.storage.as_ref(), &self.topology, supitem_id)
                .await;
        };

        let open_for_supitem = context
            .get_shared(&open_aggr_key(supitem_id))
            .await?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.is_empty())
            .map(CorreventId::from_string);

        Ok(DependencyResolution {
            predecessors: parse_correvent_ids(predecessors)?,
            successors: parse_correvent_ids(successors)?,
            open_for_supitem,
        })
    }

    async fn apply_problem(
        &self,
        raw_event: RawEventId,
        timestamp: i64,
        resolution: DependencyResolution,
    ) -> Result<CorreventAction, EngineError> {
        // Row 1: already open for this exact SupItem — a recurrence, not a
        // new problem. Bump occurrence and leave membership untouched.
        if let Some(existing) = resolution.open_for_supitem {
            self.storage.bump_occurrence(existing, timestamp).await?;
            self.recompute_priority(existing).await?;
            return Ok(CorreventAction::Recurred(existing));
        }

        // Row 2: one or more predecessor aggregates are already open
        // upstream. This SupItem joins EVERY one of them as a member — the
        // diamond topology (§4.6) requires a descendant of two independent
        // problematic ancestors to belong to both aggregates simultaneously,
        // not just the first. No new aggregate is created.
        if let Some(&first) = resolution.predecessors.first() {
            for &target in &resolution.predecessors {
                self.storage.add_member(target, raw_event).await?;
                self.recompute_priority(target).await?;
            }
            return Ok(CorreventAction::JoinedPredecessor(first));
        }

        // Row 3: no predecessor is open, but one or more aggregates rooted
        // downstream of this SupItem are open. This SupItem is the true
        // root: reopen (or create) its own aggregate and absorb every
        // successor aggregate into it (§4.6, Merge).
        if !resolution.successors.is_empty() {
            let root = self.create_or_reopen(raw_event).await?;
            for successor in &resolution.successors {
                self.storage.merge_correvents(root, *successor).await?;
            }
            self.recompute_priority(root).await?;
            return Ok(CorreventAction::ReopenedAndMerged(root));
        }

        // Row 4: nothing open anywhere nearby. Root a fresh aggregate.
        let created = self.create_or_reopen(raw_event).await?;
        self.recompute_priority(created).await?;
        Ok(CorreventAction::Created(created))
    }

    /// Reuse a previously resolved aggregate rooted at `raw_event`'s
    /// SupItem if one exists (a problem recurring at the same cause after
    /// desaggregation), otherwise create a fresh one.
    async fn create_or_reopen(&self, raw_event: RawEventId) -> Result<CorreventId, EngineError> {
        let Some(existing) = self
            .storage
            .correvents_by_cause_supitem(self.cause_supitem(raw_event).await?)
            .await?
            .into_iter()
            .find(|c| c.resolved)
        else {
            let correvent = self.storage.create_correvent(raw_event, 1, 0).await?;
            return Ok(correvent.id);
        };
        // Desaggregation leaves only the cause as a member; a recurrence at
        // the same cause reuses the id rather than minting a new one.
        self.storage.set_priority(existing.id, 1).await.ok();
        Ok(existing.id)
    }

    async fn cause_supitem(&self, raw_event: RawEventId) -> Result<SupItemId, EngineError> {
        let raw = self
            .storage
            .get_raw_event(raw_event)
            .await?
            .ok_or_else(|| EngineError::InvalidMessage(format!("raw event {raw_event} not found")))?;
        Ok(raw.supitem_id)
    }

    /// Desaggregate (§4.6): the SupItem at `supitem_id` returned to a
    /// nominal state. If it causes a live aggregate, free every non-cause
    /// member onto the nearest still-problematic ancestor of that member (if
    /// any), then resolve the now cause-only aggregate.
    async fn desaggregate(&self, supitem_id: SupItemId) -> Result<CorreventAction, EngineError> {
        let Some(correvent) = self.storage.open_correvent_for_supitem(supitem_id).await? else {
            // Nominal event, nothing open for this SupItem: NoProblem should
            // already have short-circuited upstream in the Ingestor, but
            // treat this defensively as a no-op rather than fail.
            return Err(EngineError::InvalidMessage(format!(
                "desaggregate called for supitem {supitem_id} with no open correvent"
            )));
        }

        let problem_supitems = self.storage.problem_supitems().await?;
        let members: Vec<RawEventId> =
            correvent.members.iter().copied().filter(|m| *m != correvent.cause).collect();

        for member in members {
            self.storage.remove_member(correvent.id, member).await?;
            let Some(member_raw) = self.storage.get_raw_event(member).await? else { continue };
            let member_supitem = member_raw.supitem_id;

            let nearest = self
                .topology
                .nearest_ancestors_matching(member_supitem, |candidate| {
                    problem_supitems.contains(&candidate) && candidate != supitem_id
                });
            // A member with more than one equally-near still-problematic
            // ancestor (the diamond topology, §4.6 Design Notes): re-home it
            // under the first, and let that ancestor's own aggregate pick up
            // the rest on its next event via row 2 above — every aggregate
            // rooted at a surviving ancestor converges on the same final
            // membership regardless of processing order, since `add_member`
            // is idempotent.
            if let Some(&new_root_supitem) = nearest.first() {
                if let Some(new_root_raw) = self.storage.get_raw_event_by_supitem(new_root_supitem).await? {
                    if let Some(new_root_correvent) =
                        self.storage.open_correvent_for_supitem(new_root_supitem).await?
                    {
                        self.storage.add_member(new_root_correvent.id, member).await?;
                    } else {
                        let created = self.storage.create_correvent(new_root_raw.id, 1, 0).await?;
                        self.storage.add_member(created.id, member).await?;
                    }
                    self.recompute_priority(
                        self.storage
                            .open_correvent_for_supitem(new_root_supitem)
                            .await?
                            .map(|c| c.id)
                            .unwrap_or(correvent.id),
                    )
                    .await?;
                }
            } else if problem_supitems.contains(&member_supitem) {
                // No surviving ancestor covers this member, but it still has
                // an active problem of its own: it becomes the root of a
                // fresh aggregate (§4.6 Desaggregate, §8 scenario S3's
                // trivial H2 aggregate), rather than going homeless.
                if self.storage.open_correvent_for_supitem(member_supitem).await?.is_none() {
                    self.storage.create_correvent(member, 1, 0).await?;
                }
            }
            // else: member itself is nominal; it is simply dropped from
            // every aggregate.
        }

        self.storage.resolve_correvent(correvent.id).await?;
        Ok(CorreventAction::Desaggregated(correvent.id))
    }

    async fn recompute_priority(&self, id: CorreventId) -> Result<(), EngineError> {
        // Priority is out-of-scope as a pluggable rule body (§1): bigger
        // aggregate, higher priority, unconditionally.
        if let Some(correvent) = self.storage.get_correvent(id).await? {
            self.storage.set_priority(id, correvent.members.len() as i32).await?;
        }
        Ok(())
    }
}

fn parse_correvent_ids(value: Value) -> Result<Vec<CorreventId>, EngineError> {
    let entries = value.as_array().ok_or_else(|| {
        EngineError::InvalidMessage("expected a JSON array of correvent ids in context".to_string())
    })?;
    entries
        .iter()
        .map(|entry| {
            entry.as_str().map(CorreventId::from_string).ok_or_else(|| {
                EngineError::InvalidMessage(
                    "expected a string correvent id in context".to_string(),
                )
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "correvent_manager_tests.rs"]
mod tests;
