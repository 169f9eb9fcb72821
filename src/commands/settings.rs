// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{CURRENCY_SYMBOL_KEY, DEFAULT_UNIT_KEY, Settings, set_setting};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let s = Settings::load(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Setting", "Value"],
                        vec![
                            vec![CURRENCY_SYMBOL_KEY.into(), s.currency_symbol],
                            vec![DEFAULT_UNIT_KEY.into(), s.default_unit],
                        ],
                    )
                );
            }
        }
        Some(("set-currency", sub)) => {
            let symbol = sub.get_one::<String>("symbol").unwrap().trim();
            if symbol.is_empty() {
                bail!("Currency symbol cannot be empty");
            }
            set_setting(conn, CURRENCY_SYMBOL_KEY, symbol)?;
            println!("Currency symbol set to {}", symbol);
        }
        Some(("set-unit", sub)) => {
            let unit = sub.get_one::<String>("unit").unwrap().trim().to_uppercase();
            if unit.is_empty() {
                bail!("Unit cannot be empty");
            }
            set_setting(conn, DEFAULT_UNIT_KEY, &unit)?;
            println!("Default unit set to {}", unit);
        }
        _ => {}
    }
    Ok(())
}
