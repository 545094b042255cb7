// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable store for the offline action queue.
//!
//! The [`Store`] holds two things that must survive a restart: the queue of
//! not-yet-confirmed user actions, and per-tenant caches of reference
//! entities (cards, steps, departments). Every mutating call is a single
//! statement, so a crash leaves either the old or the new row, never half.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::action::QueuedAction;
use crate::error::{Error, Result};

/// SQL schema for the durable store.
pub const SCHEMA: &str = r#"
-- Offline action queue; AUTOINCREMENT guarantees ids are never reused
CREATE TABLE IF NOT EXISTS actions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    retry_count INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    tenant_id TEXT NOT NULL,
    user_id TEXT NOT NULL
);

-- Read-through caches of reference data, last write wins
CREATE TABLE IF NOT EXISTS entity_cache (
    kind TEXT NOT NULL,            -- card|step|department
    tenant_id TEXT NOT NULL,
    id TEXT NOT NULL,
    data TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (kind, tenant_id, id)
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_actions_created ON actions(created_at, id);
CREATE INDEX IF NOT EXISTS idx_actions_tenant ON actions(tenant_id);
CREATE INDEX IF NOT EXISTS idx_entity_cache_tenant ON entity_cache(tenant_id);
"#;

/// Kinds of reference entity kept in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Card,
    Step,
    Department,
}

impl EntityKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Card => "card",
            EntityKind::Step => "step",
            EntityKind::Department => "department",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "card" => Ok(EntityKind::Card),
            "step" => Ok(EntityKind::Step),
            "department" => Ok(EntityKind::Department),
            _ => Err(Error::InvalidEntityKind(s.to_string())),
        }
    }
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            Error::CorruptedData(format!("invalid timestamp '{value}' in column '{column}'"))
        })
}

/// Parse a JSON payload column from the database.
fn parse_json(value: &str, column: &str) -> Result<serde_json::Value> {
    serde_json::from_str(value)
        .map_err(|_| Error::CorruptedData(format!("invalid JSON in column '{column}'")))
}

fn required(value: Option<String>, column: &str) -> Result<String> {
    value.ok_or_else(|| Error::CorruptedData(format!("missing text in column '{column}'")))
}

const ACTION_COLUMNS: &str =
    "id, kind, payload, created_at, retry_count, last_error, tenant_id, user_id";

/// An action row read without interpretation, so one bad row cannot fail
/// a whole scan.
struct RawAction {
    id: i64,
    kind: Option<String>,
    payload: Option<String>,
    created_at: Option<String>,
    retry_count: Option<i64>,
    last_error: Option<String>,
    tenant_id: Option<String>,
    user_id: Option<String>,
}

impl RawAction {
    fn from_row(row: &Row<'_>) -> std::result::Result<Self, rusqlite::Error> {
        let text = |idx: usize| -> std::result::Result<Option<String>, rusqlite::Error> {
            Ok(row.get_ref(idx)?.as_str().ok().map(str::to_string))
        };
        Ok(RawAction {
            id: row.get(0)?,
            kind: text(1)?,
            payload: text(2)?,
            created_at: text(3)?,
            retry_count: row.get_ref(4)?.as_i64().ok(),
            last_error: text(5)?,
            tenant_id: text(6)?,
            user_id: text(7)?,
        })
    }

    fn decode(self) -> Result<QueuedAction> {
        let payload = required(self.payload, "payload")?;
        let created_at = required(self.created_at, "created_at")?;
        let retry_count = self
            .retry_count
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| Error::CorruptedData("invalid value in column 'retry_count'".into()))?;
        Ok(QueuedAction {
            id: self.id,
            kind: required(self.kind, "kind")?,
            payload: parse_json(&payload, "payload")?,
            created_at: parse_timestamp(&created_at, "created_at")?,
            retry_count,
            last_error: self.last_error,
            tenant_id: required(self.tenant_id, "tenant_id")?,
            user_id: required(self.user_id, "user_id")?,
        })
    }
}

/// One queue row in replay order.
///
/// `action` holds the decoded row, or why it could not be decoded. `id` and
/// `kind` are always available so an unreadable row can still be removed.
#[derive(Debug)]
pub struct QueueEntry {
    pub id: i64,
    pub kind: String,
    pub action: Result<QueuedAction>,
}

/// SQLite connection holding the action queue and entity caches.
pub struct Store {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Store {
    /// Open a store at the given path, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL keeps readers (status commands) from blocking the sync loop
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(Store { conn })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    // -- Action queue --------------------------------------------------------

    /// Append an action to the queue and return its assigned id.
    ///
    /// The action starts with `retry_count = 0` and `created_at = now`.
    pub fn enqueue(
        &self,
        kind: &str,
        payload: &serde_json::Value,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<i64> {
        if kind.trim().is_empty() {
            return Err(Error::InvalidInput("action type must not be empty".into()));
        }
        let payload = serde_json::to_string(payload)?;
        self.conn.execute(
            "INSERT INTO actions (kind, payload, created_at, retry_count, tenant_id, user_id)
             VALUES (?1, ?2, ?3, 0, ?4, ?5)",
            params![kind, payload, Utc::now().to_rfc3339(), tenant_id, user_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Return every queued action in replay order.
    ///
    /// Replay order is insertion order. `created_at` is stamped at insertion,
    /// so this is also ascending `created_at`; the id breaks ties and
    /// guards against wall-clock steps backwards.
    ///
    /// Fails if any row is corrupted; use [`Store::entries`] to read past one.
    pub fn dequeue_all(&self) -> Result<Vec<QueuedAction>> {
        self.entries()?.into_iter().map(|entry| entry.action).collect()
    }

    /// Every queue row in replay order, each decoded on its own.
    pub fn entries(&self) -> Result<Vec<QueueEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ACTION_COLUMNS} FROM actions ORDER BY id"))?;
        let rows = stmt
            .query_map([], RawAction::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .map(|raw| QueueEntry {
                id: raw.id,
                kind: raw.kind.clone().unwrap_or_default(),
                action: raw.decode(),
            })
            .collect())
    }

    /// Look up a single queued action.
    pub fn get(&self, id: i64) -> Result<Option<QueuedAction>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {ACTION_COLUMNS} FROM actions WHERE id = ?1"),
                [id],
                RawAction::from_row,
            )
            .optional()?;
        raw.map(RawAction::decode).transpose()
    }

    /// Delete an action. Removing a missing id is a no-op.
    pub fn remove(&self, id: i64) -> Result<()> {
        self.conn.execute("DELETE FROM actions WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Record a failed attempt on an action.
    pub fn update_retry(&self, id: i64, retry_count: u32, last_error: Option<&str>) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE actions SET retry_count = ?1, last_error = ?2 WHERE id = ?3",
            params![retry_count, last_error, id],
        )?;
        if changed == 0 {
            return Err(Error::ActionNotFound(id));
        }
        Ok(())
    }

    /// Number of queued actions.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM actions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of queued actions owned by one tenant.
    pub fn count_for_tenant(&self, tenant_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM actions WHERE tenant_id = ?1",
            [tenant_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Drop every queued action.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM actions", [])?;
        Ok(())
    }

    // -- Entity cache --------------------------------------------------------

    /// Store an entity, replacing any previous copy.
    pub fn put<T: Serialize>(
        &self,
        kind: EntityKind,
        tenant_id: &str,
        id: &str,
        entity: &T,
    ) -> Result<()> {
        let data = serde_json::to_string(entity)?;
        self.conn.execute(
            "INSERT INTO entity_cache (kind, tenant_id, id, data, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (kind, tenant_id, id)
             DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            params![kind.as_str(), tenant_id, id, data, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Every cached entity of a kind for one tenant, ordered by id.
    pub fn get_all<T: DeserializeOwned>(&self, kind: EntityKind, tenant_id: &str) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(
            "SELECT data FROM entity_cache WHERE kind = ?1 AND tenant_id = ?2 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![kind.as_str(), tenant_id], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|data| serde_json::from_str(data).map_err(Error::from))
            .collect()
    }

    /// One cached entity, if present.
    pub fn get_entity<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        tenant_id: &str,
        id: &str,
    ) -> Result<Option<T>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM entity_cache WHERE kind = ?1 AND tenant_id = ?2 AND id = ?3",
                params![kind.as_str(), tenant_id, id],
                |row| row.get(0),
            )
            .optional()?;
        data.map(|d| serde_json::from_str(&d).map_err(Error::from))
            .transpose()
    }

    /// Drop every cached entity belonging to a tenant.
    ///
    /// Returns the number of entities removed. Queued actions are untouched.
    pub fn clear_for_tenant(&self, tenant_id: &str) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM entity_cache WHERE tenant_id = ?1", [tenant_id])?;
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
