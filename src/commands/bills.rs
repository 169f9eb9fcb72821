// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::Settings;
use crate::ledger::Ledger;
use crate::models::LineItem;
use crate::store::{HistoryStore, MemoryStore, SqliteStore};
use crate::utils::{fmt_money, maybe_print_json, parse_item_spec, pretty_table};

pub fn quote(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    // Quotes never touch the saved history.
    let mut ledger = Ledger::with_default_unit(MemoryStore::new(), &settings.default_unit);
    build_session(&mut ledger, item_specs(sub))?;

    let view = QuoteView {
        items: ledger
            .line_items()
            .iter()
            .enumerate()
            .map(|(i, it)| ItemView::new(i, it))
            .collect(),
        total: ledger.aggregate_total(),
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        println!("{}", items_table(ledger.line_items(), &settings.currency_symbol));
        println!(
            "Total Bill: {}",
            fmt_money(&view.total, &settings.currency_symbol)
        );
    }
    Ok(())
}

pub fn save(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let customer = sub.get_one::<String>("customer").unwrap();
    let mut ledger = Ledger::open(SqliteStore::new(conn), &settings.default_unit);
    build_session(&mut ledger, item_specs(sub))?;

    let notice = ledger
        .save_bill(customer)
        .map_err(|e| anyhow!("{}", e.notice()))?;
    println!("{}", notice);
    println!(
        "Total Bill: {}",
        fmt_money(&ledger.aggregate_total(), &settings.currency_symbol)
    );
    Ok(())
}

fn item_specs(sub: &clap::ArgMatches) -> Vec<String> {
    sub.get_many::<String>("item")
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default()
}

/// Fill a session from item specs. The first spec edits the session's
/// initial line item; each further spec adds one.
pub fn build_session<S, I>(ledger: &mut Ledger<S>, specs: I) -> Result<()>
where
    S: HistoryStore,
    I: IntoIterator<Item = String>,
{
    for (n, spec) in specs.into_iter().enumerate() {
        let edits = parse_item_spec(&spec)?;
        let id = if n == 0 {
            ledger.line_items()[0].id().clone()
        } else {
            ledger.add_line_item().0
        };
        for (field, raw) in edits {
            ledger
                .update_line_item(&id, field, &raw)
                .map_err(|e| anyhow!("{}", e.notice()))?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ItemView {
    pub product: String,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub unit_price: Decimal,
    pub amount_unit: String,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub amount_qty: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub gst_percent: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub transport_rate: Decimal,
    pub transport_unit: String,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub transport_qty: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub base: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub gst: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub transport: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub subtotal: Decimal,
}

impl ItemView {
    pub fn new(position: usize, item: &LineItem) -> Self {
        let b = item.breakdown();
        let inp = item.inputs();
        Self {
            product: item.display_name(position),
            unit_price: inp.unit_price,
            amount_unit: item.amount_unit().to_string(),
            amount_qty: inp.amount_qty,
            gst_percent: inp.gst_percent,
            transport_rate: inp.transport_rate,
            transport_unit: item.transport_unit().to_string(),
            transport_qty: inp.transport_qty,
            base: b.base,
            gst: b.tax,
            transport: b.transport,
            subtotal: b.subtotal,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteView {
    pub items: Vec<ItemView>,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub total: Decimal,
}

pub fn items_table(items: &[LineItem], symbol: &str) -> comfy_table::Table {
    let rows = items
        .iter()
        .enumerate()
        .map(|(i, it)| {
            let v = ItemView::new(i, it);
            vec![
                v.product,
                format!(
                    "{} / {} × {} = {}",
                    v.unit_price,
                    v.amount_unit,
                    v.amount_qty,
                    fmt_money(&v.base, symbol)
                ),
                format!("{}% = {}", v.gst_percent, fmt_money(&v.gst, symbol)),
                format!(
                    "{} / {} × {} = {}",
                    v.transport_rate,
                    v.transport_unit,
                    v.transport_qty,
                    fmt_money(&v.transport, symbol)
                ),
                fmt_money(&v.subtotal, symbol),
            ]
        })
        .collect();
    pretty_table(&["Product", "Amount", "GST", "Transport", "Subtotal"], rows)
}
