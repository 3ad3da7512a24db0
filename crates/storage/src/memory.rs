// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! In-process `StorageGateway`: a `parking_lot`-guarded map standing in for
//! the relational store (§4.4). Good enough for tests and small
//! deployments; the `postgres` feature adds a real one.

use crate::{DbError, HistoryOutcome, StateOutcome, StorageGateway};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use vigil_core::{
    AckStatus, Correvent, CorreventId, RawEvent, RawEventId, StateName, SupItem, SupItemId,
};

#[derive(Default)]
struct State {
    supitems_by_key: HashMap<(Option<String>, Option<String>), SupItemId>,
    supitems: HashMap<SupItemId, SupItem>,
    raw_events_by_supitem: HashMap<SupItemId, RawEventId>,
    raw_events: HashMap<RawEventId, RawEvent>,
    correvents: HashMap<CorreventId, Correvent>,
}

#[derive(Default)]
pub struct InMemoryStorageGateway {
    state: Mutex<State>,
}

impl InMemoryStorageGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageGateway for InMemoryStorageGateway {
    async fn probe(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn get_or_create_supitem(
        &self,
        host: Option<&str>,
        service: Option<&str>,
    ) -> Result<SupItem, DbError> {
        let mut state = self.state.lock();
        let key = (host.map(str::to_string), service.map(str::to_string));
        if let Some(id) = state.supitems_by_key.get(&key) {
            return Ok(state.supitems[id].clone());
        }
        let id = SupItemId::new();
        let supitem = match (&key.0, &key.1) {
            (Some(h), Some(s)) => SupItem::service(id, h, s),
            (Some(h), None) => SupItem::host(id, h),
            (None, Some(s)) => SupItem::hls(id, s),
            (None, None) => {
                return Err(DbError::Fatal("supitem requires a host or a service".to_string()));
            }
        };
        state.supitems_by_key.insert(key, supitem.id);
        state.supitems.insert(supitem.id, supitem.clone());
        Ok(supitem)
    }

    async fn get_supitem(&self, id: SupItemId) -> Result<Option<SupItem>, DbError> {
        Ok(self.state.lock().supitems.get(&id).cloned())
    }

    async fn get_raw_event(&self, id: RawEventId) -> Result<Option<RawEvent>, DbError> {
        Ok(self.state.lock().raw_events.get(&id).cloned())
    }

    async fn get_raw_event_by_supitem(&self, supitem_id: SupItemId) -> Result<Option<RawEvent>, DbError> {
        let state = self.state.lock();
        Ok(state
            .raw_events_by_supitem
            .get(&supitem_id)
            .and_then(|id| state.raw_events.get(id))
            .cloned())
    }

    async fn problem_supitems(&self) -> Result<HashSet<SupItemId>, DbError> {
        let state = self.state.lock();
        Ok(state
            .raw_events
            .values()
            .filter(|e| e.current_state.is_problem())
            .map(|e| e.supitem_id)
            .collect())
    }

    async fn insert_state(
        &self,
        supitem_id: SupItemId,
        state_name: StateName,
        message: &str,
        timestamp: i64,
    ) -> Result<StateOutcome, DbError> {
        let mut state = self.state.lock();
        if let Some(existing_id) = state.raw_events_by_supitem.get(&supitem_id).copied() {
            let Some(existing) = state.raw_events.get_mut(&existing_id) else {
                return Err(DbError::Fatal(format!("supitem {supitem_id} indexed to missing raw event")));
            };
            if timestamp < existing.timestamp {
                return Ok(StateOutcome::Stale(vigil_core::StaleState {
                    current: existing.timestamp,
                    received: timestamp,
                }));
            }
            let previous = existing.current_state;
            existing.apply_state(state_name, message.to_string(), timestamp);
            Ok(StateOutcome::Accepted { raw_event_id: existing_id, previous })
        } else {
            let id = RawEventId::new();
            let raw_event = RawEvent::new(id, supitem_id, state_name, message.to_string(), timestamp);
            state.raw_events_by_supitem.insert(supitem_id, id);
            state.raw_events.insert(id, raw_event);
            // No prior state on record; `previous == state_name` signals
            // "nothing to compare against" to rules reading context.
            Ok(StateOutcome::Accepted { raw_event_id: id, previous: state_name })
        }
    }

    async fn insert_event(&self, raw_event_id: RawEventId) -> Result<HistoryOutcome, DbError> {
        self.insert_history(raw_event_id)
    }

    async fn insert_hls_history(&self, raw_event_id: RawEventId) -> Result<HistoryOutcome, DbError> {
        self.insert_history(raw_event_id)
    }

    async fn has_open_correvent_for_supitem(&self, supitem_id: SupItemId) -> Result<bool, DbError> {
        Ok(self.open_correvent_for_supitem_locked(&self.state.lock(), supitem_id).is_some())
    }

    async fn open_correvent_for_supitem(
        &self,
        supitem_id: SupItemId,
    ) -> Result<Option<Correvent>, DbError> {
        Ok(self.open_correvent_for_supitem_locked(&self.state.lock(), supitem_id).cloned())
    }

    async fn get_correvent(&self, id: CorreventId) -> Result<Option<Correvent>, DbError> {
        Ok(self.state.lock().correvents.get(&id).cloned())
    }

    async fn open_correvents(&self) -> Result<Vec<Correvent>, DbError> {
        Ok(self.state.lock().correvents.values().filter(|c| !c.resolved).cloned().collect())
    }

    async fn correvents_by_cause_supitem(
        &self,
        supitem_id: SupItemId,
    ) -> Result<Vec<Correvent>, DbError> {
        let state = self.state.lock();
        Ok(state
            .correvents
            .values()
            .filter(|c| state.raw_events.get(&c.cause).map(|e| e.supitem_id) == Some(supitem_id))
            .cloned()
            .collect())
    }

    async fn create_correvent(
        &self,
        cause: RawEventId,
        priority: i32,
        activation_timestamp: i64,
    ) -> Result<Correvent, DbError> {
        let mut state = self.state.lock();
        let id = CorreventId::new();
        let correvent = Correvent::new(id, cause, priority, activation_timestamp);
        state.correvents.insert(correvent.id, correvent.clone());
        Ok(correvent)
    }

    async fn add_member(&self, correvent_id: CorreventId, member: RawEventId) -> Result<(), DbError> {
        let mut state = self.state.lock();
        let correvent = state
            .correvents
            .get_mut(&correvent_id)
            .ok_or_else(|| DbError::Fatal(format!("correvent {correvent_id} not found")))?;
        correvent.add_member(member);
        Ok(())
    }

    async fn remove_member(&self, correvent_id: CorreventId, member: RawEventId) -> Result<(), DbError> {
        let mut state = self.state.lock();
        let correvent = state
            .correvents
            .get_mut(&correvent_id)
            .ok_or_else(|| DbError::Fatal(format!("correvent {correvent_id} not found")))?;
        correvent.remove_member(&member);
        Ok(())
    }

    async fn merge_correvents(
        &self,
        into: CorreventId,
        from: CorreventId,
    ) -> Result<Vec<RawEventId>, DbError> {
        let mut state = self.state.lock();
        let moved: Vec<RawEventId> = state
            .correvents
            .get(&from)
            .ok_or_else(|| DbError::Fatal(format!("correvent {from} not found")))?
            .members
            .iter()
            .copied()
            .collect();
        {
            let target = state
                .correvents
                .get_mut(&into)
                .ok_or_else(|| DbError::Fatal(format!("correvent {into} not found")))?;
            for member in &moved {
                target.add_member(*member);
            }
        }
        state.correvents.remove(&from);
        Ok(moved)
    }

    async fn delete_correvent(&self, id: CorreventId) -> Result<(), DbError> {
        self.state.lock().correvents.remove(&id);
        Ok(())
    }

    async fn resolve_correvent(&self, id: CorreventId) -> Result<(), DbError> {
        let mut state = self.state.lock();
        let correvent = state
            .correvents
            .get_mut(&id)
            .ok_or_else(|| DbError::Fatal(format!("correvent {id} not found")))?;
        correvent.resolve();
        Ok(())
    }

    async fn bump_occurrence(&self, id: CorreventId, activation_timestamp: i64) -> Result<(), DbError> {
        let mut state = self.state.lock();
        let correvent = state
            .correvents
            .get_mut(&id)
            .ok_or_else(|| DbError::Fatal(format!("correvent {id} not found")))?;
        correvent.bump_occurrence(activation_timestamp);
        Ok(())
    }

    async fn set_priority(&self, id: CorreventId, priority: i32) -> Result<(), DbError> {
        let mut state = self.state.lock();
        let correvent = state
            .correvents
            .get_mut(&id)
            .ok_or_else(|| DbError::Fatal(format!("correvent {id} not found")))?;
        correvent.priority = priority;
        Ok(())
    }

    async fn set_ticket(&self, id: CorreventId, ticket: Option<String>) -> Result<(), DbError> {
        let mut state = self.state.lock();
        let correvent = state
            .correvents
            .get_mut(&id)
            .ok_or_else(|| DbError::Fatal(format!("correvent {id} not found")))?;
        correvent.ticket = ticket;
        Ok(())
    }

    async fn set_ack(&self, id: CorreventId, ack: AckStatus) -> Result<(), DbError> {
        let mut state = self.state.lock();
        let correvent = state
            .correvents
            .get_mut(&id)
            .ok_or_else(|| DbError::Fatal(format!("correvent {id} not found")))?;
        correvent.ack = ack;
        Ok(())
    }
}

impl InMemoryStorageGateway {
    fn insert_history(&self, raw_event_id: RawEventId) -> Result<HistoryOutcome, DbError> {
        let state = self.state.lock();
        let raw_event = state
            .raw_events
            .get(&raw_event_id)
            .ok_or_else(|| DbError::Fatal(format!("raw event {raw_event_id} not found")))?;
        if raw_event.current_state.is_nominal()
            && self.open_correvent_for_supitem_locked(&state, raw_event.supitem_id).is_none()
        {
            return Ok(HistoryOutcome::NoProblem);
        }
        Ok(HistoryOutcome::Inserted)
    }

    fn open_correvent_for_supitem_locked<'a>(
        &self,
        state: &'a State,
        supitem_id: SupItemId,
    ) -> Option<&'a Correvent> {
        state.correvents.values().find(|c| {
            state.raw_events.get(&c.cause).map(|e| e.supitem_id) == Some(supitem_id) && !c.resolved
        })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
