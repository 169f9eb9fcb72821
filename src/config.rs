// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::models::DEFAULT_UNIT;

pub const CURRENCY_SYMBOL_KEY: &str = "currency_symbol";
pub const DEFAULT_UNIT_KEY: &str = "default_unit";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub currency_symbol: String,
    pub default_unit: String,
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self {
            currency_symbol: get_setting(conn, CURRENCY_SYMBOL_KEY)?
                .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
            default_unit: get_setting(conn, DEFAULT_UNIT_KEY)?
                .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        })
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}
