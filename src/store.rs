// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! History repositories.
//!
//! The whole history is one named JSON document. Every save rewrites it in
//! full; there are no incremental updates.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::StoreError;
use crate::models::Bill;

pub const HISTORY_RECORD: &str = "billHistory";

pub trait HistoryStore {
    /// Absent history is `Ok(vec![])`.
    fn load(&self) -> Result<Vec<Bill>, StoreError>;
    fn save(&mut self, bills: &[Bill]) -> Result<(), StoreError>;

    /// Keep a copy of a history document that could not be decoded, so the
    /// next save does not destroy it. Returns where the copy went.
    fn preserve_unreadable(&mut self) -> Result<Option<String>, StoreError> {
        Ok(None)
    }
}

pub fn encode(bills: &[Bill]) -> Result<String, StoreError> {
    serde_json::to_string(bills).map_err(StoreError::Encode)
}

pub fn decode(body: &str) -> Result<Vec<Bill>, StoreError> {
    serde_json::from_str(body).map_err(StoreError::Malformed)
}

/// History kept in the `records` table of the application database.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl HistoryStore for SqliteStore<'_> {
    fn load(&self) -> Result<Vec<Bill>, StoreError> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM records WHERE name=?1",
                params![HISTORY_RECORD],
                |r| r.get(0),
            )
            .optional()?;
        match body {
            Some(s) => decode(&s),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, bills: &[Bill]) -> Result<(), StoreError> {
        let body = encode(bills)?;
        self.conn.execute(
            "INSERT INTO records(name, body) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET body=excluded.body, updated_at=datetime('now')",
            params![HISTORY_RECORD, body],
        )?;
        Ok(())
    }

    fn preserve_unreadable(&mut self) -> Result<Option<String>, StoreError> {
        let backup = format!(
            "{}.unreadable-{}",
            HISTORY_RECORD,
            Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
        );
        let copied = self.conn.execute(
            "INSERT OR REPLACE INTO records(name, body) SELECT ?2, body FROM records WHERE name=?1",
            params![HISTORY_RECORD, backup],
        )?;
        Ok((copied > 0).then_some(backup))
    }
}

/// In-process store. Holds the encoded document so that loads go through
/// the same decoding path as the database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    body: Option<String>,
    unreadable: Option<String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn unreadable(&self) -> Option<&str> {
        self.unreadable.as_deref()
    }

    /// Replace the stored document as another writer would.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<Bill>, StoreError> {
        match &self.body {
            Some(s) => decode(s),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, bills: &[Bill]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        self.body = Some(encode(bills)?);
        Ok(())
    }

    fn preserve_unreadable(&mut self) -> Result<Option<String>, StoreError> {
        self.unreadable = self.body.clone();
        Ok(self.unreadable.as_ref().map(|_| "unreadable".to_string()))
    }
}
