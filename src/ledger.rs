// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Session line items plus the saved bill history.
//!
//! The session always holds at least one line item. Destructive operations
//! are two-phase: a `request_*` call records a [`PendingDeletion`], and
//! nothing changes until [`Ledger::confirm_deletion`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::calc;
use crate::errors::{LedgerError, StoreError};
use crate::models::{Bill, DEFAULT_UNIT, Field, LineItem, LineItemId};
use crate::notice::Notice;
use crate::store::HistoryStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDeletion {
    LineItem(LineItemId),
    HistoryEntry {
        index: usize,
        customer_name: String,
        saved_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Applied(Notice),
    Cancelled,
}

pub struct Ledger<S: HistoryStore> {
    store: S,
    items: Vec<LineItem>,
    next_seq: u64,
    default_unit: String,
    history: Vec<Bill>,
    pending: Option<PendingDeletion>,
    viewing: Option<usize>,
}

impl<S: HistoryStore> Ledger<S> {
    /// A fresh session with one blank line item and an empty history.
    pub fn new(store: S) -> Self {
        Self::with_default_unit(store, DEFAULT_UNIT)
    }

    pub fn with_default_unit(store: S, unit: &str) -> Self {
        let mut ledger = Self {
            store,
            items: Vec::new(),
            next_seq: 1,
            default_unit: unit.to_string(),
            history: Vec::new(),
            pending: None,
            viewing: None,
        };
        ledger.push_blank_item();
        ledger
    }

    /// `new` followed by `load_history`.
    pub fn open(store: S, unit: &str) -> Self {
        let mut ledger = Self::with_default_unit(store, unit);
        ledger.load_history();
        ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // ---- session ----

    fn push_blank_item(&mut self) -> LineItemId {
        let id = LineItemId::new(self.next_seq);
        self.next_seq += 1;
        self.items.push(LineItem::new(id.clone(), &self.default_unit));
        id
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn line_item(&self, id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|it| it.id() == id)
    }

    pub fn add_line_item(&mut self) -> (LineItemId, Notice) {
        let id = self.push_blank_item();
        debug!(id = %id, count = self.items.len(), "line item added");
        (
            id,
            Notice::info(
                "Line Item Added",
                "A new line item has been added to your session.",
            ),
        )
    }

    /// Apply one raw field edit and return the recomputed item.
    pub fn update_line_item(
        &mut self,
        id: &LineItemId,
        field: Field,
        raw: &str,
    ) -> Result<&LineItem, LedgerError> {
        let item = self
            .items
            .iter_mut()
            .find(|it| it.id() == id)
            .ok_or_else(|| unknown_item(id))?;
        item.set(field, raw);
        debug!(id = %id, ?field, subtotal = %item.subtotal(), "line item updated");
        Ok(item)
    }

    pub fn aggregate_total(&self) -> Decimal {
        calc::aggregate(self.items.iter().map(LineItem::subtotal))
    }

    fn check_removable(&self, id: &LineItemId) -> Result<(), LedgerError> {
        if self.line_item(id).is_none() {
            return Err(unknown_item(id));
        }
        if self.items.len() <= 1 {
            return Err(LedgerError::precondition(
                "Cannot Delete",
                "You need to have at least one line item.",
            ));
        }
        Ok(())
    }

    /// First phase of removing a line item. Returns the confirmation prompt.
    pub fn request_line_item_removal(&mut self, id: &LineItemId) -> Result<Notice, LedgerError> {
        self.check_removable(id)?;
        self.pending = Some(PendingDeletion::LineItem(id.clone()));
        Ok(Notice::destructive(
            "Confirm Deletion",
            "Are you sure you want to delete this line item?",
        ))
    }

    // ---- history ----

    /// Read the persisted history. Missing or unreadable data leaves an
    /// empty history.
    pub fn load_history(&mut self) {
        self.viewing = None;
        if matches!(self.pending, Some(PendingDeletion::HistoryEntry { .. })) {
            self.pending = None;
        }
        self.history = match self.store.load() {
            Ok(bills) => bills,
            Err(e) => {
                warn!(error = %e, "history unreadable; starting empty");
                if let StoreError::Malformed(_) = e {
                    match self.store.preserve_unreadable() {
                        Ok(Some(backup)) => {
                            warn!(backup = %backup, "unreadable history copied aside")
                        }
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "could not copy unreadable history aside"),
                    }
                }
                Vec::new()
            }
        };
        debug!(bills = self.history.len(), "history loaded");
    }

    pub fn history(&self) -> &[Bill] {
        &self.history
    }

    pub fn save_bill(&mut self, customer_name: &str) -> Result<Notice, LedgerError> {
        self.save_bill_at(customer_name, Utc::now())
    }

    /// Snapshot the session into a new bill. The in-memory history only
    /// changes once the store accepted the new document.
    pub fn save_bill_at(
        &mut self,
        customer_name: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<Notice, LedgerError> {
        let name = customer_name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation(
                "Name Required",
                "Please enter a customer name to save the bill.",
            ));
        }
        let bill = Bill::snapshot(name.to_string(), saved_at, self.items.clone());
        let mut updated = self.history.clone();
        updated.push(bill);
        if let Err(e) = self.store.save(&updated) {
            warn!(error = %e, customer = name, "bill save not persisted");
            return Err(LedgerError::persistence("Save Failed", e));
        }
        self.history = updated;
        info!(
            customer = name,
            items = self.items.len(),
            total = %self.aggregate_total(),
            "bill saved"
        );
        Ok(Notice::info(
            "Bill Saved",
            format!("Bill for {} has been saved successfully.", name),
        ))
    }

    /// Case-insensitive substring match on the customer name. Yields the
    /// history index alongside each bill, in save order.
    pub fn search_history<'a>(
        &'a self,
        term: &str,
    ) -> impl Iterator<Item = (usize, &'a Bill)> + use<'a, S> {
        let needle = term.to_lowercase();
        self.history
            .iter()
            .enumerate()
            .filter(move |(_, b)| b.customer_name().to_lowercase().contains(&needle))
    }

    pub fn open_detail(&mut self, index: usize) -> Result<&Bill, LedgerError> {
        let bill = self
            .history
            .get(index)
            .ok_or_else(|| out_of_range(index, self.history.len()))?;
        self.viewing = Some(index);
        Ok(bill)
    }

    pub fn detail(&self) -> Option<&Bill> {
        self.viewing.and_then(|i| self.history.get(i))
    }

    pub fn close_detail(&mut self) {
        self.viewing = None;
    }

    /// First phase of deleting a saved bill.
    pub fn request_history_deletion(&mut self, index: usize) -> Result<Notice, LedgerError> {
        let bill = self
            .history
            .get(index)
            .ok_or_else(|| out_of_range(index, self.history.len()))?;
        self.pending = Some(PendingDeletion::HistoryEntry {
            index,
            customer_name: bill.customer_name().to_string(),
            saved_at: bill.saved_at(),
        });
        Ok(Notice::destructive(
            "Confirm Delete",
            "Are you sure you want to delete this bill from history?",
        ))
    }

    // ---- two-phase deletion ----

    pub fn pending_deletion(&self) -> Option<&PendingDeletion> {
        self.pending.as_ref()
    }

    pub fn cancel_deletion(&mut self) -> DeletionOutcome {
        self.pending = None;
        DeletionOutcome::Cancelled
    }

    /// Apply the pending deletion. Preconditions are checked again since the
    /// state may have moved on since the request.
    pub fn confirm_deletion(&mut self) -> Result<DeletionOutcome, LedgerError> {
        match self.pending.take() {
            None => Ok(DeletionOutcome::Cancelled),
            Some(PendingDeletion::LineItem(id)) => {
                self.check_removable(&id)?;
                self.items.retain(|it| it.id() != &id);
                debug!(id = %id, count = self.items.len(), "line item removed");
                Ok(DeletionOutcome::Applied(Notice::info(
                    "Line Item Deleted",
                    "The line item has been removed from your session.",
                )))
            }
            Some(PendingDeletion::HistoryEntry {
                index,
                customer_name,
                saved_at,
            }) => {
                let same_bill = self.history.get(index).is_some_and(|b| {
                    b.customer_name() == customer_name && b.saved_at() == saved_at
                });
                if !same_bill {
                    return Err(LedgerError::precondition(
                        "Bill Changed",
                        "The bill at that position is no longer the one selected for deletion.",
                    ));
                }
                self.delete_history_entry(index)?;
                Ok(DeletionOutcome::Applied(Notice::info(
                    "Record Deleted",
                    "The bill has been removed from history.",
                )))
            }
        }
    }

    fn delete_history_entry(&mut self, index: usize) -> Result<(), LedgerError> {
        if index >= self.history.len() {
            return Err(out_of_range(index, self.history.len()));
        }
        let mut updated = self.history.clone();
        let removed = updated.remove(index);
        if let Err(e) = self.store.save(&updated) {
            warn!(error = %e, index, "bill deletion not persisted");
            return Err(LedgerError::persistence("Delete Failed", e));
        }
        self.history = updated;
        self.viewing = match self.viewing {
            Some(v) if v == index => None,
            Some(v) if v > index => Some(v - 1),
            other => other,
        };
        info!(index, customer = removed.customer_name(), "bill deleted");
        Ok(())
    }
}

fn unknown_item(id: &LineItemId) -> LedgerError {
    LedgerError::precondition("Unknown Line Item", format!("No line item with id '{}'.", id))
}

fn out_of_range(index: usize, len: usize) -> LedgerError {
    LedgerError::precondition(
        "Bill Not Found",
        format!("No bill at index {} (history has {}).", index, len),
    )
}
