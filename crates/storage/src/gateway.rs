// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The DB Gateway boundary (§4.4) plus the relational operations the State/
//! History Writer and Correvent Manager drive through it (§4.5, §4.6).

use crate::{DbError, HistoryOutcome, StateOutcome};
use async_trait::async_trait;
use std::collections::HashSet;
use vigil_core::{AckStatus, Correvent, CorreventId, RawEvent, RawEventId, StateName, SupItem, SupItemId};

/// A single-writer bridge between the async pipeline and the relational
/// store. The in-process default ([`crate::InMemoryStorageGateway`]) backs
/// tests and small deployments; the `postgres` feature adds a `sqlx`-backed
/// implementation for a real relational store.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Startup probe (§4.4): if this fails the process aborts rather than
    /// looping against a dead database.
    async fn probe(&self) -> Result<(), DbError>;

    /// `SupItem.get_supitem(host, service)` (§4.5 step 1), creating the row
    /// on first sight.
    async fn get_or_create_supitem(
        &self,
        host: Option<&str>,
        service: Option<&str>,
    ) -> Result<SupItem, DbError>;

    async fn get_supitem(&self, id: SupItemId) -> Result<Option<SupItem>, DbError>;

    async fn get_raw_event(&self, id: RawEventId) -> Result<Option<RawEvent>, DbError>;

    /// The RawEvent row for a SupItem, if one has ever been recorded (§3:
    /// one per SupItem, mutated in place).
    async fn get_raw_event_by_supitem(&self, supitem_id: SupItemId) -> Result<Option<RawEvent>, DbError>;

    /// Every SupItem whose current RawEvent state is a problem state, used
    /// by desaggregation to find a member's nearest still-problematic
    /// ancestor (§4.6, Desaggregate).
    async fn problem_supitems(&self) -> Result<HashSet<SupItemId>, DbError>;

    /// Upsert the SupItem's RawEvent row (§4.5 step 3).
    async fn insert_state(
        &self,
        supitem_id: SupItemId,
        state: StateName,
        message: &str,
        timestamp: i64,
    ) -> Result<StateOutcome, DbError>;

    /// Host/service history entry (§4.5 step 4).
    async fn insert_event(&self, raw_event_id: RawEventId) -> Result<HistoryOutcome, DbError>;

    /// High-level-service history entry (§4.5 step 4), used instead of
    /// `insert_event` when the event's host was nulled by the HLS-sentinel
    /// rule.
    async fn insert_hls_history(&self, raw_event_id: RawEventId) -> Result<HistoryOutcome, DbError>;

    /// Whether a live Correvent is currently open with this SupItem as its
    /// cause — the authoritative check behind `NoProblem` short-circuiting.
    async fn has_open_correvent_for_supitem(&self, supitem_id: SupItemId) -> Result<bool, DbError>;

    async fn open_correvent_for_supitem(
        &self,
        supitem_id: SupItemId,
    ) -> Result<Option<Correvent>, DbError>;

    async fn get_correvent(&self, id: CorreventId) -> Result<Option<Correvent>, DbError>;

    /// Every live (non-resolved) Correvent, used to classify a SupItem's
    /// relationship to each open aggregate (§4.6: predecessors/successors).
    async fn open_correvents(&self) -> Result<Vec<Correvent>, DbError>;

    /// Correvents whose cause SupItem is `supitem_id`, regardless of
    /// resolved/open status (desaggregated Correvents are kept as history).
    async fn correvents_by_cause_supitem(
        &self,
        supitem_id: SupItemId,
    ) -> Result<Vec<Correvent>, DbError>;

    /// Create Correvent C with `cause=raw_event`, `members={raw_event}`.
    async fn create_correvent(
        &self,
        cause: RawEventId,
        priority: i32,
        activation_timestamp: i64,
    ) -> Result<Correvent, DbError>;

    async fn add_member(&self, correvent_id: CorreventId, member: RawEventId) -> Result<(), DbError>;

    async fn remove_member(&self, correvent_id: CorreventId, member: RawEventId) -> Result<(), DbError>;

    /// Move every member of `from` into `into` (set-union), delete `from`,
    /// and return the ids that were moved (§4.6, Merge).
    async fn merge_correvents(
        &self,
        into: CorreventId,
        from: CorreventId,
    ) -> Result<Vec<RawEventId>, DbError>;

    async fn delete_correvent(&self, id: CorreventId) -> Result<(), DbError>;

    /// Desaggregate's terminal step (§4.6): drop every member except the
    /// cause and mark the aggregate resolved. The aggregate is kept as
    /// historical record, not deleted.
    async fn resolve_correvent(&self, id: CorreventId) -> Result<(), DbError>;

    async fn bump_occurrence(&self, id: CorreventId, activation_timestamp: i64) -> Result<(), DbError>;

    async fn set_priority(&self, id: CorreventId, priority: i32) -> Result<(), DbError>;

    async fn set_ticket(&self, id: CorreventId, ticket: Option<String>) -> Result<(), DbError>;

    async fn set_ack(&self, id: CorreventId, ack: AckStatus) -> Result<(), DbError>;
}
