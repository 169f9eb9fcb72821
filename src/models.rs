// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calc::{self, Breakdown, Inputs};

pub const DEFAULT_UNIT: &str = "KG";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(String);

impl LineItemId {
    pub fn new(seq: u64) -> Self {
        Self(format!("item-{}", seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Editable fields of a line item. `subtotal` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ProductName,
    UnitPrice,
    AmountUnit,
    AmountQty,
    GstPercent,
    TransportRate,
    TransportUnit,
    TransportQty,
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let f = match s.trim().to_lowercase().as_str() {
            "name" | "product" | "product_name" => Field::ProductName,
            "price" | "unit_price" => Field::UnitPrice,
            "unit" | "amount_unit" => Field::AmountUnit,
            "qty" | "amount_qty" => Field::AmountQty,
            "gst" | "gst_percent" => Field::GstPercent,
            "transport" | "transport_rate" => Field::TransportRate,
            "tunit" | "transport_unit" => Field::TransportUnit,
            "tqty" | "transport_qty" => Field::TransportQty,
            other => return Err(format!("Unknown line item field '{}'", other)),
        };
        Ok(f)
    }
}

/// One product's billing inputs. The subtotal is derived on demand and
/// cannot be assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LineItemRecord", into = "LineItemRecord")]
pub struct LineItem {
    id: LineItemId,
    product_name: String,
    amount_unit: String,
    transport_unit: String,
    inputs: Inputs,
}

impl LineItem {
    pub fn new(id: LineItemId, unit: &str) -> Self {
        Self {
            id,
            product_name: String::new(),
            amount_unit: unit.to_string(),
            transport_unit: unit.to_string(),
            inputs: Inputs::default(),
        }
    }

    pub fn id(&self) -> &LineItemId {
        &self.id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn amount_unit(&self) -> &str {
        &self.amount_unit
    }

    pub fn transport_unit(&self) -> &str {
        &self.transport_unit
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    pub fn breakdown(&self) -> Breakdown {
        calc::compute(&self.inputs)
    }

    pub fn subtotal(&self) -> Decimal {
        calc::subtotal(&self.inputs)
    }

    /// Apply a raw form value. Numeric fields fall back to zero.
    pub fn set(&mut self, field: Field, raw: &str) {
        match field {
            Field::ProductName => self.product_name = raw.to_string(),
            Field::AmountUnit => self.amount_unit = raw.trim().to_string(),
            Field::TransportUnit => self.transport_unit = raw.trim().to_string(),
            Field::UnitPrice => self.inputs.unit_price = calc::lenient_decimal(raw),
            Field::AmountQty => self.inputs.amount_qty = calc::lenient_decimal(raw),
            Field::GstPercent => self.inputs.gst_percent = calc::lenient_decimal(raw),
            Field::TransportRate => self.inputs.transport_rate = calc::lenient_decimal(raw),
            Field::TransportQty => self.inputs.transport_qty = calc::lenient_decimal(raw),
        }
    }

    /// Label shown when the product name is blank (`position` is zero-based).
    pub fn display_name(&self, position: usize) -> String {
        if self.product_name.trim().is_empty() {
            format!("Product {}", position + 1)
        } else {
            self.product_name.clone()
        }
    }
}

/// Wire shape of a line item. Older records used `amount`, `gst`,
/// `transport` and `total`; those names are still read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemRecord {
    id: LineItemId,
    #[serde(default)]
    product_name: String,
    #[serde(alias = "amount", with = "rust_decimal::serde::arbitrary_precision")]
    unit_price: Decimal,
    #[serde(default = "default_unit")]
    amount_unit: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    amount_qty: Decimal,
    #[serde(alias = "gst", with = "rust_decimal::serde::arbitrary_precision")]
    gst_percent: Decimal,
    #[serde(alias = "transport", with = "rust_decimal::serde::arbitrary_precision")]
    transport_rate: Decimal,
    #[serde(default = "default_unit")]
    transport_unit: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    transport_qty: Decimal,
    // Written for readers of the stored document; recomputed on load.
    #[serde(
        skip_deserializing,
        serialize_with = "rust_decimal::serde::arbitrary_precision::serialize"
    )]
    subtotal: Decimal,
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

impl From<LineItemRecord> for LineItem {
    fn from(r: LineItemRecord) -> Self {
        Self {
            id: r.id,
            product_name: r.product_name,
            amount_unit: r.amount_unit,
            transport_unit: r.transport_unit,
            inputs: Inputs {
                unit_price: r.unit_price,
                amount_qty: r.amount_qty,
                gst_percent: r.gst_percent,
                transport_rate: r.transport_rate,
                transport_qty: r.transport_qty,
            },
        }
    }
}

impl From<LineItem> for LineItemRecord {
    fn from(item: LineItem) -> Self {
        let subtotal = item.subtotal();
        Self {
            id: item.id,
            product_name: item.product_name,
            unit_price: item.inputs.unit_price,
            amount_unit: item.amount_unit,
            amount_qty: item.inputs.amount_qty,
            gst_percent: item.inputs.gst_percent,
            transport_rate: item.inputs.transport_rate,
            transport_unit: item.transport_unit,
            transport_qty: item.inputs.transport_qty,
            subtotal,
        }
    }
}

/// A saved, immutable snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(alias = "name")]
    customer_name: String,
    #[serde(alias = "date")]
    saved_at: DateTime<Utc>,
    #[serde(alias = "calculations")]
    line_items: Vec<LineItem>,
    #[serde(alias = "totalBill", with = "rust_decimal::serde::arbitrary_precision")]
    total_amount: Decimal,
}

impl Bill {
    pub(crate) fn snapshot(
        customer_name: String,
        saved_at: DateTime<Utc>,
        line_items: Vec<LineItem>,
    ) -> Self {
        let total_amount = calc::aggregate(line_items.iter().map(LineItem::subtotal));
        Self {
            customer_name,
            saved_at,
            line_items,
            total_amount,
        }
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn item_count_label(&self) -> String {
        match self.line_items.len() {
            1 => "1 item".to_string(),
            n => format!("{} items", n),
        }
    }
}
