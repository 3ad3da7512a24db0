// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! `sqlx`-backed [`StorageGateway`] against the relational tables named in
//! §6: `supitem`, `raw_event`, `correvent`, `correvent_member`. The schema
//! itself is owned by the external supervision model (§1, §6); this module
//! only issues the parameterized queries the operations in §4.4-§4.6
//! require against that shape, inside a transaction per call by default.
//!
//! Connectivity failures and serialization conflicts (Postgres error class
//! `40xxx`) classify as [`DbError::Transient`] so the Dispatcher re-enqueues
//! the message (§4.4, §7); everything else is [`DbError::Fatal`].

use crate::{DbError, HistoryOutcome, StateOutcome, StorageGateway};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Row, Transaction};
use std::collections::HashSet;
use std::time::Duration;
use vigil_core::{
    AckStatus, Correvent, CorreventId, RawEvent, RawEventId, StateName, StaleState, SupItem,
    SupItemId,
};

/// A connection pool bridging the async pipeline to a real Postgres store
/// (§4.4: "a single-writer bridge between the async pipeline and the
/// blocking SQL layer" — `sqlx` makes the bridge non-blocking, but the
/// transaction-per-call default and error classification are unchanged).
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    /// Connect with a small bounded pool; `dsn` is opaque to the core (§6).
    pub async fn connect(dsn: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(dsn)
            .await
            .map_err(classify)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'_, Postgres>, DbError> {
        self.pool.begin().await.map_err(classify)
    }
}

fn classify(err: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        // Postgres class 08 (connection), 40 (transaction rollback,
        // including serialization_failure) — retry via the caller's
        // re-enqueue path rather than drop the message (§4.4, §7).
        if let Some(code) = db_err.code() {
            if code.starts_with("08") || code.starts_with("40") {
                return DbError::Transient(err.to_string());
            }
        }
    }
    if matches!(err, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) {
        return DbError::Transient(err.to_string());
    }
    DbError::Fatal(err.to_string())
}

fn row_to_supitem(row: &sqlx::postgres::PgRow) -> Result<SupItem, DbError> {
    let id: String = row.try_get("id").map_err(classify)?;
    let host: Option<String> = row.try_get("host").map_err(classify)?;
    let service: Option<String> = row.try_get("service").map_err(classify)?;
    Ok(SupItem { id: SupItemId::from_string(id), host, service })
}

fn row_to_raw_event(row: &sqlx::postgres::PgRow) -> Result<RawEvent, DbError> {
    let id: String = row.try_get("id").map_err(classify)?;
    let supitem_id: String = row.try_get("supitem_id").map_err(classify)?;
    let state: String = row.try_get("current_state").map_err(classify)?;
    let message: String = row.try_get("message").map_err(classify)?;
    let timestamp: i64 = row.try_get("timestamp").map_err(classify)?;
    Ok(RawEvent {
        id: RawEventId::from_string(id),
        supitem_id: SupItemId::from_string(supitem_id),
        current_state: StateName::parse(&state),
        message,
        timestamp,
    })
}

fn ack_to_str(ack: AckStatus) -> &'static str {
    match ack {
        AckStatus::None => "NONE",
        AckStatus::Ack => "ACK",
        AckStatus::Closed => "CLOSED",
    }
}

fn ack_from_str(raw: &str) -> AckStatus {
    match raw {
        "ACK" => AckStatus::Ack,
        "CLOSED" => AckStatus::Closed,
        _ => AckStatus::None,
    }
}

impl PgGateway {
    async fn load_correvent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: CorreventId,
    ) -> Result<Option<Correvent>, DbError> {
        let Some(row) = sqlx::query(
            "SELECT id, cause, priority, ticket, ack, occurrence, activation_timestamp, resolved \
             FROM correvent WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(classify)?
        else {
            return Ok(None);
        };

        let cause: String = row.try_get("cause").map_err(classify)?;
        let priority: i32 = row.try_get("priority").map_err(classify)?;
        let ticket: Option<String> = row.try_get("ticket").map_err(classify)?;
        let ack: String = row.try_get("ack").map_err(classify)?;
        let occurrence: i32 = row.try_get("occurrence").map_err(classify)?;
        let activation_timestamp: i64 = row.try_get("activation_timestamp").map_err(classify)?;
        let resolved: bool = row.try_get("resolved").map_err(classify)?;

        let member_rows = sqlx::query("SELECT raw_event_id FROM correvent_member WHERE correvent_id = $1")
            .bind(id.as_str())
            .fetch_all(&mut **tx)
            .await
            .map_err(classify)?;
        let members = member_rows
            .iter()
            .map(|r| r.try_get::<String, _>("raw_event_id").map(RawEventId::from_string))
            .collect::<Result<_, _>>()
            .map_err(classify)?;

        Ok(Some(Correvent {
            id,
            cause: RawEventId::from_string(cause),
            priority,
            ticket,
            ack: ack_from_str(&ack),
            occurrence: occurrence as u32,
            activation_timestamp,
            members,
            resolved,
        }))
    }
}

#[async_trait]
impl StorageGateway for PgGateway {
    async fn probe(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(classify)?;
        Ok(())
    }

    async fn get_or_create_supitem(
        &self,
        host: Option<&str>,
        service: Option<&str>,
    ) -> Result<SupItem, DbError> {
        if host.is_none() && service.is_none() {
            return Err(DbError::Fatal("supitem requires a host or a service".to_string()));
        }
        let mut tx = self.begin().await?;
        if let Some(row) = sqlx::query(
            "SELECT id, host, service FROM supitem WHERE host IS NOT DISTINCT FROM $1 \
             AND service IS NOT DISTINCT FROM $2",
        )
        .bind(host)
        .bind(service)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify)?
        {
            let supitem = row_to_supitem(&row)?;
            tx.commit().await.map_err(classify)?;
            return Ok(supitem);
        }

        let id = SupItemId::new();
        sqlx::query("INSERT INTO supitem (id, host, service) VALUES ($1, $2, $3)")
            .bind(id.as_str())
            .bind(host)
            .bind(service)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        tx.commit().await.map_err(classify)?;
        Ok(SupItem { id, host: host.map(str::to_string), service: service.map(str::to_string) })
    }

    async fn get_supitem(&self, id: SupItemId) -> Result<Option<SupItem>, DbError> {
        let row = sqlx::query("SELECT id, host, service FROM supitem WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        row.as_ref().map(row_to_supitem).transpose()
    }

    async fn get_raw_event(&self, id: RawEventId) -> Result<Option<RawEvent>, DbError> {
        let row = sqlx::query(
            "SELECT id, supitem_id, current_state, message, timestamp FROM raw_event WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;
        row.as_ref().map(row_to_raw_event).transpose()
    }

    async fn get_raw_event_by_supitem(&self, supitem_id: SupItemId) -> Result<Option<RawEvent>, DbError> {
        let row = sqlx::query(
            "SELECT id, supitem_id, current_state, message, timestamp FROM raw_event \
             WHERE supitem_id = $1",
        )
        .bind(supitem_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;
        row.as_ref().map(row_to_raw_event).transpose()
    }

    async fn problem_supitems(&self) -> Result<HashSet<SupItemId>, DbError> {
        let rows = sqlx::query(
            "SELECT supitem_id FROM raw_event WHERE current_state NOT IN ('UP', 'OK')",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;
        rows.iter()
            .map(|r| r.try_get::<String, _>("supitem_id").map(SupItemId::from_string))
            .collect::<Result<_, _>>()
            .map_err(classify)
    }

    async fn insert_state(
        &self,
        supitem_id: SupItemId,
        state: StateName,
        message: &str,
        timestamp: i64,
    ) -> Result<StateOutcome, DbError> {
        let mut tx = self.begin().await?;
        let existing = sqlx::query(
            "SELECT id, current_state, timestamp FROM raw_event WHERE supitem_id = $1 FOR UPDATE",
        )
        .bind(supitem_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify)?;

        let outcome = if let Some(row) = existing {
            let id: String = row.try_get("id").map_err(classify)?;
            let previous_raw: String = row.try_get("current_state").map_err(classify)?;
            let previous_ts: i64 = row.try_get("timestamp").map_err(classify)?;
            if timestamp < previous_ts {
                StateOutcome::Stale(StaleState { current: previous_ts, received: timestamp })
            } else {
                sqlx::query(
                    "UPDATE raw_event SET current_state = $1, message = $2, timestamp = $3 WHERE id = $4",
                )
                .bind(state.as_str())
                .bind(message)
                .bind(timestamp)
                .bind(&id)
                .execute(&mut *tx)
                .await
                .map_err(classify)?;
                StateOutcome::Accepted {
                    raw_event_id: RawEventId::from_string(id),
                    previous: StateName::parse(&previous_raw),
                }
            }
        } else {
            let id = RawEventId::new();
            sqlx::query(
                "INSERT INTO raw_event (id, supitem_id, current_state, message, timestamp) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(id.as_str())
            .bind(supitem_id.as_str())
            .bind(state.as_str())
            .bind(message)
            .bind(timestamp)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
            StateOutcome::Accepted { raw_event_id: id, previous: state }
        };

        tx.commit().await.map_err(classify)?;
        Ok(outcome)
    }

    async fn insert_event(&self, raw_event_id: RawEventId) -> Result<HistoryOutcome, DbError> {
        self.insert_history(raw_event_id).await
    }

    async fn insert_hls_history(&self, raw_event_id: RawEventId) -> Result<HistoryOutcome, DbError> {
        self.insert_history(raw_event_id).await
    }

    async fn has_open_correvent_for_supitem(&self, supitem_id: SupItemId) -> Result<bool, DbError> {
        Ok(self.open_correvent_for_supitem(supitem_id).await?.is_some())
    }

    async fn open_correvent_for_supitem(
        &self,
        supitem_id: SupItemId,
    ) -> Result<Option<Correvent>, DbError> {
        let row = sqlx::query(
            "SELECT c.id FROM correvent c JOIN raw_event r ON r.id = c.cause \
             WHERE r.supitem_id = $1 AND c.resolved = false",
        )
        .bind(supitem_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;
        let Some(row) = row else { return Ok(None) };
        let id: String = row.try_get("id").map_err(classify)?;
        self.get_correvent(CorreventId::from_string(id)).await
    }

    async fn get_correvent(&self, id: CorreventId) -> Result<Option<Correvent>, DbError> {
        let mut tx = self.begin().await?;
        let result = self.load_correvent(&mut tx, id).await?;
        tx.commit().await.map_err(classify)?;
        Ok(result)
    }

    async fn open_correvents(&self) -> Result<Vec<Correvent>, DbError> {
        let rows = sqlx::query("SELECT id FROM correvent WHERE resolved = false")
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id").map_err(classify)?;
            if let Some(correvent) = self.get_correvent(CorreventId::from_string(id)).await? {
                out.push(correvent);
            }
        }
        Ok(out)
    }

    async fn correvents_by_cause_supitem(
        &self,
        supitem_id: SupItemId,
    ) -> Result<Vec<Correvent>, DbError> {
        let rows = sqlx::query(
            "SELECT c.id FROM correvent c JOIN raw_event r ON r.id = c.cause WHERE r.supitem_id = $1",
        )
        .bind(supitem_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id").map_err(classify)?;
            if let Some(correvent) = self.get_correvent(CorreventId::from_string(id)).await? {
                out.push(correvent);
            }
        }
        Ok(out)
    }

    async fn create_correvent(
        &self,
        cause: RawEventId,
        priority: i32,
        activation_timestamp: i64,
    ) -> Result<Correvent, DbError> {
        let id = CorreventId::new();
        let mut tx = self.begin().await?;
        sqlx::query(
            "INSERT INTO correvent (id, cause, priority, ticket, ack, occurrence, \
             activation_timestamp, resolved) VALUES ($1, $2, $3, NULL, 'NONE', 1, $4, false)",
        )
        .bind(id.as_str())
        .bind(cause.as_str())
        .bind(priority)
        .bind(activation_timestamp)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        sqlx::query("INSERT INTO correvent_member (correvent_id, raw_event_id) VALUES ($1, $2)")
            .bind(id.as_str())
            .bind(cause.as_str())
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        tx.commit().await.map_err(classify)?;
        Ok(Correvent::new(id, cause, priority, activation_timestamp))
    }

    async fn add_member(&self, correvent_id: CorreventId, member: RawEventId) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO correvent_member (correvent_id, raw_event_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(correvent_id.as_str())
        .bind(member.as_str())
        .execute(&self.pool)
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn remove_member(&self, correvent_id: CorreventId, member: RawEventId) -> Result<(), DbError> {
        sqlx::query(
            "DELETE FROM correvent_member WHERE correvent_id = $1 AND raw_event_id = $2 \
             AND raw_event_id != (SELECT cause FROM correvent WHERE id = $1)",
        )
        .bind(correvent_id.as_str())
        .bind(member.as_str())
        .execute(&self.pool)
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn merge_correvents(
        &self,
        into: CorreventId,
        from: CorreventId,
    ) -> Result<Vec<RawEventId>, DbError> {
        let mut tx = self.begin().await?;
        let rows = sqlx::query("SELECT raw_event_id FROM correvent_member WHERE correvent_id = $1")
            .bind(from.as_str())
            .fetch_all(&mut *tx)
            .await
            .map_err(classify)?;
        let moved: Vec<RawEventId> = rows
            .iter()
            .map(|r| r.try_get::<String, _>("raw_event_id").map(RawEventId::from_string))
            .collect::<Result<_, _>>()
            .map_err(classify)?;

        for member in &moved {
            sqlx::query(
                "INSERT INTO correvent_member (correvent_id, raw_event_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(into.as_str())
            .bind(member.as_str())
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        }
        sqlx::query("DELETE FROM correvent_member WHERE correvent_id = $1").bind(from.as_str()).execute(&mut *tx).await.map_err(classify)?;
        sqlx::query("DELETE FROM correvent WHERE id = $1").bind(from.as_str()).execute(&mut *tx).await.map_err(classify)?;
        tx.commit().await.map_err(classify)?;
        Ok(moved)
    }

    async fn delete_correvent(&self, id: CorreventId) -> Result<(), DbError> {
        let mut tx = self.begin().await?;
        sqlx::query("DELETE FROM correvent_member WHERE correvent_id = $1").bind(id.as_str()).execute(&mut *tx).await.map_err(classify)?;
        sqlx::query("DELETE FROM correvent WHERE id = $1").bind(id.as_str()).execute(&mut *tx).await.map_err(classify)?;
        tx.commit().await.map_err(classify)?;
        Ok(())
    }

    async fn resolve_correvent(&self, id: CorreventId) -> Result<(), DbError> {
        let mut tx = self.begin().await?;
        sqlx::query(
            "DELETE FROM correvent_member WHERE correvent_id = $1 \
             AND raw_event_id != (SELECT cause FROM correvent WHERE id = $1)",
        )
        .bind(id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        sqlx::query("UPDATE correvent SET resolved = true WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        tx.commit().await.map_err(classify)?;
        Ok(())
    }

    async fn bump_occurrence(&self, id: CorreventId, activation_timestamp: i64) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE correvent SET occurrence = occurrence + 1, activation_timestamp = $2 WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(activation_timestamp)
        .execute(&self.pool)
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn set_priority(&self, id: CorreventId, priority: i32) -> Result<(), DbError> {
        sqlx::query("UPDATE correvent SET priority = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(priority)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn set_ticket(&self, id: CorreventId, ticket: Option<String>) -> Result<(), DbError> {
        sqlx::query("UPDATE correvent SET ticket = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(ticket)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn set_ack(&self, id: CorreventId, ack: AckStatus) -> Result<(), DbError> {
        sqlx::query("UPDATE correvent SET ack = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(ack_to_str(ack))
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

impl PgGateway {
    async fn insert_history(&self, raw_event_id: RawEventId) -> Result<HistoryOutcome, DbError> {
        let Some(raw_event) = self.get_raw_event(raw_event_id).await? else {
            return Err(DbError::Fatal(format!("raw event {raw_event_id} not found")));
        };
        if raw_event.current_state.is_nominal()
            && !self.has_open_correvent_for_supitem(raw_event.supitem_id).await?
        {
            return Ok(HistoryOutcome::NoProblem);
        }
        sqlx::query(
            "INSERT INTO event_history (raw_event_id, state, message, timestamp) VALUES ($1, $2, $3, $4)",
        )
        .bind(raw_event_id.as_str())
        .bind(raw_event.current_state.as_str())
        .bind(&raw_event.message)
        .bind(raw_event.timestamp)
        .execute(&self.pool)
        .await
        .map_err(classify)?;
        Ok(HistoryOutcome::Inserted)
    }
}
