// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::bills::{ItemView, items_table};
use crate::config::Settings;
use crate::ledger::{DeletionOutcome, Ledger};
use crate::models::Bill;
use crate::store::{HistoryStore, SqliteStore};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let mut ledger = Ledger::open(SqliteStore::new(conn), &settings.default_unit);
    match m.subcommand() {
        Some(("list", sub)) => list(&ledger, &settings, sub)?,
        Some(("show", sub)) => show(&mut ledger, &settings, sub)?,
        Some(("rm", sub)) => remove(&mut ledger, sub)?,
        Some(("export", sub)) => export(&ledger, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct HistoryRow {
    pub index: usize,
    pub customer: String,
    pub saved_at: String,
    pub items: usize,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub total: Decimal,
}

pub fn query_rows<S: HistoryStore>(ledger: &Ledger<S>, term: &str) -> Vec<HistoryRow> {
    ledger
        .search_history(term)
        .map(|(index, b)| HistoryRow {
            index,
            customer: b.customer_name().to_string(),
            saved_at: b.saved_at().to_rfc3339(),
            items: b.line_items().len(),
            total: b.total_amount(),
        })
        .collect()
}

fn list<S: HistoryStore>(
    ledger: &Ledger<S>,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let term = sub
        .get_one::<String>("search")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let data = query_rows(ledger, &term);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No bills found");
        return Ok(());
    }
    let rows = ledger
        .search_history(&term)
        .map(|(index, b)| {
            vec![
                index.to_string(),
                b.customer_name().to_string(),
                b.saved_at().format("%Y-%m-%d").to_string(),
                b.item_count_label(),
                fmt_money(&b.total_amount(), &settings.currency_symbol),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["#", "Customer", "Date", "Items", "Total"], rows)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct BillView {
    index: usize,
    customer: String,
    saved_at: String,
    items: Vec<ItemView>,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    total: Decimal,
}

fn show<S: HistoryStore>(
    ledger: &mut Ledger<S>,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let index = *sub.get_one::<usize>("index").unwrap();
    let bill = ledger
        .open_detail(index)
        .map_err(|e| anyhow!("{}", e.notice()))?;
    let view = BillView {
        index,
        customer: bill.customer_name().to_string(),
        saved_at: bill.saved_at().to_rfc3339(),
        items: bill
            .line_items()
            .iter()
            .enumerate()
            .map(|(i, it)| ItemView::new(i, it))
            .collect(),
        total: bill.total_amount(),
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        println!("{}'s Bill", bill.customer_name());
        println!("Date: {}", bill.saved_at().format("%Y-%m-%d %H:%M:%S UTC"));
        println!("{}", items_table(bill.line_items(), &settings.currency_symbol));
        println!(
            "Total Amount: {}",
            fmt_money(&bill.total_amount(), &settings.currency_symbol)
        );
    }
    ledger.close_detail();
    Ok(())
}

fn remove<S: HistoryStore>(ledger: &mut Ledger<S>, sub: &clap::ArgMatches) -> Result<()> {
    let index = *sub.get_one::<usize>("index").unwrap();
    let prompt = ledger
        .request_history_deletion(index)
        .map_err(|e| anyhow!("{}", e.notice()))?;
    if !sub.get_flag("yes") {
        ledger.cancel_deletion();
        println!("{}", prompt);
        println!("Nothing deleted; pass --yes to confirm.");
        return Ok(());
    }
    match ledger
        .confirm_deletion()
        .map_err(|e| anyhow!("{}", e.notice()))?
    {
        DeletionOutcome::Applied(notice) => println!("{}", notice),
        DeletionOutcome::Cancelled => println!("Nothing deleted."),
    }
    Ok(())
}

fn export<S: HistoryStore>(ledger: &Ledger<S>, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    match fmt.as_str() {
        "csv" => export_csv(ledger.history(), out)?,
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(ledger.history())?)
                .with_context(|| format!("Write {}", out))?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported {} bills to {}", ledger.history().len(), out);
    Ok(())
}

fn export_csv(bills: &[Bill], out: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out).with_context(|| format!("Open {}", out))?;
    wtr.write_record([
        "bill",
        "customer",
        "saved_at",
        "product",
        "unit_price",
        "amount_unit",
        "amount_qty",
        "gst_percent",
        "transport_rate",
        "transport_unit",
        "transport_qty",
        "subtotal",
        "bill_total",
    ])?;
    for (i, bill) in bills.iter().enumerate() {
        for item in bill.line_items() {
            let inp = item.inputs();
            wtr.write_record([
                i.to_string(),
                bill.customer_name().to_string(),
                bill.saved_at().to_rfc3339(),
                item.product_name().to_string(),
                inp.unit_price.to_string(),
                item.amount_unit().to_string(),
                inp.amount_qty.to_string(),
                inp.gst_percent.to_string(),
                inp.transport_rate.to_string(),
                item.transport_unit().to_string(),
                inp.transport_qty.to_string(),
                item.subtotal().to_string(),
                bill.total_amount().to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
