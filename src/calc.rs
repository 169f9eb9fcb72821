// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Line-item arithmetic.
//!
//! Everything here is pure: the same inputs always produce the same
//! [`Breakdown`]. Values are kept at full precision; rounding to two places
//! is a display concern (see [`crate::utils::fmt_money`]).

use rust_decimal::Decimal;
use serde::Serialize;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The six numeric inputs of a line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inputs {
    pub unit_price: Decimal,
    pub amount_qty: Decimal,
    pub gst_percent: Decimal,
    pub transport_rate: Decimal,
    pub transport_qty: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub base: Decimal,
    pub tax: Decimal,
    pub transport: Decimal,
    pub subtotal: Decimal,
}

/// base = price * qty, tax = base * gst / 100, transport = rate * qty.
///
/// Saturating arithmetic keeps the function total for every input.
pub fn compute(inputs: &Inputs) -> Breakdown {
    let base = inputs.unit_price.saturating_mul(inputs.amount_qty);
    let tax = base
        .saturating_mul(inputs.gst_percent)
        .checked_div(HUNDRED)
        .unwrap_or(Decimal::ZERO);
    let transport = inputs.transport_rate.saturating_mul(inputs.transport_qty);
    Breakdown {
        base,
        tax,
        transport,
        subtotal: base.saturating_add(tax).saturating_add(transport),
    }
}

pub fn subtotal(inputs: &Inputs) -> Decimal {
    compute(inputs).subtotal
}

/// Sum of subtotals, unrounded.
pub fn aggregate<I>(subtotals: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    subtotals
        .into_iter()
        .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s))
}

/// Parse a raw form value. Blank or non-numeric input is zero; numbers
/// beyond the representable range saturate rather than vanish.
pub fn lenient_decimal(raw: &str) -> Decimal {
    let s = raw.trim();
    if s.is_empty() {
        return Decimal::ZERO;
    }
    if let Ok(d) = s.parse::<Decimal>().or_else(|_| Decimal::from_scientific(s)) {
        return d;
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() >= 1.0 => {
            if f.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        }
        _ => Decimal::ZERO,
    }
}
