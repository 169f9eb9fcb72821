// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billclip::errors::LedgerError;
use billclip::ledger::{DeletionOutcome, Ledger, PendingDeletion};
use billclip::models::{Field, LineItemId};
use billclip::notice::NoticeKind;
use billclip::store::{HistoryStore, MemoryStore};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn fill(ledger: &mut Ledger<MemoryStore>, id: &LineItemId) {
    for (field, raw) in [
        (Field::ProductName, "Rice"),
        (Field::UnitPrice, "100"),
        (Field::AmountQty, "2"),
        (Field::GstPercent, "18"),
        (Field::TransportRate, "10"),
        (Field::TransportQty, "5"),
    ] {
        ledger.update_line_item(id, field, raw).unwrap();
    }
}

fn two_item_ledger() -> Ledger<MemoryStore> {
    let mut ledger = Ledger::new(MemoryStore::new());
    let first = ledger.line_items()[0].id().clone();
    fill(&mut ledger, &first);
    let (second, _) = ledger.add_line_item();
    fill(&mut ledger, &second);
    ledger
}

fn save_named(ledger: &mut Ledger<MemoryStore>, names: &[&str]) {
    for (i, name) in names.iter().enumerate() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1 + i as u32, 9, 30, 0).unwrap();
        ledger.save_bill_at(name, at).unwrap();
    }
}

#[test]
fn session_starts_with_one_blank_item() {
    let ledger = Ledger::new(MemoryStore::new());
    assert_eq!(ledger.line_items().len(), 1);
    let item = &ledger.line_items()[0];
    assert_eq!(item.amount_unit(), "KG");
    assert_eq!(item.transport_unit(), "KG");
    assert_eq!(ledger.aggregate_total(), Decimal::ZERO);
    assert!(ledger.history().is_empty());
}

#[test]
fn update_returns_recomputed_item() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let id = ledger.line_items()[0].id().clone();
    ledger.update_line_item(&id, Field::UnitPrice, "100").unwrap();
    let item = ledger.update_line_item(&id, Field::AmountQty, "2").unwrap();
    assert_eq!(item.subtotal(), d("200"));
}

#[test]
fn update_unknown_item_is_precondition_error() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let err = ledger
        .update_line_item(&LineItemId::new(99), Field::UnitPrice, "1")
        .unwrap_err();
    assert!(matches!(err, LedgerError::Precondition { .. }));
}

#[test]
fn aggregate_total_sums_items() {
    let mut ledger = two_item_ledger();
    assert_eq!(ledger.aggregate_total(), d("572"));
    assert_eq!(format!("{:.2}", ledger.aggregate_total()), "572.00");

    let (_, notice) = ledger.add_line_item();
    assert_eq!(notice.kind, NoticeKind::Info);
    assert_eq!(ledger.aggregate_total(), d("572"));
}

#[test]
fn ids_are_not_reused_after_removal() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let (a, _) = ledger.add_line_item();
    let (b, _) = ledger.add_line_item();
    ledger.request_line_item_removal(&a).unwrap();
    ledger.confirm_deletion().unwrap();
    let (c, _) = ledger.add_line_item();
    assert_ne!(c, a);
    assert_ne!(c, b);
    let ids: Vec<_> = ledger.line_items().iter().map(|i| i.id().clone()).collect();
    assert_eq!(ids.len(), 3);
    assert!(!ids.contains(&a));
}

#[test]
fn removal_waits_for_confirmation() {
    let mut ledger = two_item_ledger();
    let second = ledger.line_items()[1].id().clone();

    let prompt = ledger.request_line_item_removal(&second).unwrap();
    assert!(prompt.is_destructive());
    assert_eq!(
        ledger.pending_deletion(),
        Some(&PendingDeletion::LineItem(second.clone()))
    );
    assert_eq!(ledger.line_items().len(), 2);

    assert_eq!(ledger.cancel_deletion(), DeletionOutcome::Cancelled);
    assert_eq!(ledger.line_items().len(), 2);

    ledger.request_line_item_removal(&second).unwrap();
    let outcome = ledger.confirm_deletion().unwrap();
    assert!(matches!(outcome, DeletionOutcome::Applied(ref n) if n.title == "Line Item Deleted"));
    assert_eq!(ledger.line_items().len(), 1);
    assert!(ledger.line_item(&second).is_none());
    assert_eq!(ledger.aggregate_total(), d("286"));
}

#[test]
fn last_item_cannot_be_removed() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let only = ledger.line_items()[0].id().clone();
    let err = ledger.request_line_item_removal(&only).unwrap_err();
    assert!(matches!(err, LedgerError::Precondition { .. }));
    assert_eq!(err.notice().title, "Cannot Delete");
    assert!(err.notice().is_destructive());
    assert_eq!(ledger.line_items().len(), 1);
    assert!(ledger.pending_deletion().is_none());
}

#[test]
fn survivor_of_removal_cannot_be_removed() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let first = ledger.line_items()[0].id().clone();
    let (second, _) = ledger.add_line_item();

    ledger.request_line_item_removal(&first).unwrap();
    ledger.confirm_deletion().unwrap();

    // The survivor is now the only item.
    ledger.request_line_item_removal(&second).unwrap_err();
    assert_eq!(ledger.line_items().len(), 1);
}

#[test]
fn confirm_without_request_is_cancelled() {
    let mut ledger = Ledger::new(MemoryStore::new());
    assert_eq!(ledger.confirm_deletion().unwrap(), DeletionOutcome::Cancelled);
}

#[test]
fn blank_customer_name_is_rejected() {
    let mut ledger = two_item_ledger();
    for name in ["", "   ", "\t\n"] {
        let err = ledger.save_bill(name).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
        assert_eq!(err.notice().title, "Name Required");
    }
    assert!(ledger.history().is_empty());
    assert!(ledger.store().body().is_none());
}

#[test]
fn save_snapshots_session() {
    let mut ledger = two_item_ledger();
    let at = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
    let notice = ledger.save_bill_at("Acme", at).unwrap();
    assert_eq!(notice.title, "Bill Saved");
    assert_eq!(notice.description, "Bill for Acme has been saved successfully.");

    let bill = &ledger.history()[0];
    assert_eq!(bill.customer_name(), "Acme");
    assert_eq!(bill.saved_at(), at);
    assert_eq!(bill.line_items().len(), 2);
    assert_eq!(bill.total_amount(), d("572"));

    // Later session edits do not leak into the saved bill.
    let first = ledger.line_items()[0].id().clone();
    ledger.update_line_item(&first, Field::UnitPrice, "1").unwrap();
    assert_eq!(ledger.history()[0].total_amount(), d("572"));
    assert_eq!(ledger.history()[0].line_items()[0].subtotal(), d("286"));
}

#[test]
fn save_persists_full_history() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["Acme", "Globex"]);
    let stored = ledger.store().load().unwrap();
    assert_eq!(stored, ledger.history());
}

#[test]
fn failed_write_leaves_history_unchanged() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["Acme"]);
    ledger.store_mut().set_fail_writes(true);

    let err = ledger.save_bill("Globex").unwrap_err();
    assert!(matches!(err, LedgerError::Persistence { .. }));
    assert_eq!(err.notice().title, "Save Failed");
    assert_eq!(ledger.history().len(), 1);

    ledger.request_history_deletion(0).unwrap();
    let err = ledger.confirm_deletion().unwrap_err();
    assert!(matches!(err, LedgerError::Persistence { .. }));
    assert_eq!(ledger.history().len(), 1);
    assert_eq!(ledger.store().load().unwrap().len(), 1);
}

#[test]
fn search_is_case_insensitive_and_ordered() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["acme corp", "Globex", "ACME Retail"]);

    let all: Vec<usize> = ledger.search_history("").map(|(i, _)| i).collect();
    assert_eq!(all, vec![0, 1, 2]);

    let hits: Vec<(usize, &str)> = ledger
        .search_history("Acme")
        .map(|(i, b)| (i, b.customer_name()))
        .collect();
    assert_eq!(hits, vec![(0, "acme corp"), (2, "ACME Retail")]);

    assert_eq!(ledger.search_history("initech").count(), 0);
    assert_eq!(ledger.history().len(), 3);
}

#[test]
fn delete_history_entry_removes_exactly_one() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["A", "B", "C"]);
    let before = ledger.history().to_vec();

    ledger.request_history_deletion(1).unwrap();
    assert_eq!(ledger.history().len(), 3);
    let outcome = ledger.confirm_deletion().unwrap();
    assert!(matches!(outcome, DeletionOutcome::Applied(ref n) if n.title == "Record Deleted"));

    assert_eq!(ledger.history(), &[before[0].clone(), before[2].clone()][..]);
    assert_eq!(ledger.store().load().unwrap(), ledger.history());
}

#[test]
fn delete_out_of_range_is_precondition_error() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["A"]);
    let err = ledger.request_history_deletion(5).unwrap_err();
    assert!(matches!(err, LedgerError::Precondition { .. }));
    assert!(ledger.pending_deletion().is_none());
    assert_eq!(ledger.history().len(), 1);
}

#[test]
fn deleting_viewed_bill_closes_detail() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["A", "B", "C"]);

    ledger.open_detail(1).unwrap();
    ledger.request_history_deletion(1).unwrap();
    ledger.confirm_deletion().unwrap();
    assert!(ledger.detail().is_none());
}

#[test]
fn deleting_earlier_bill_keeps_detail_on_same_bill() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["A", "B", "C"]);

    ledger.open_detail(2).unwrap();
    ledger.request_history_deletion(0).unwrap();
    ledger.confirm_deletion().unwrap();
    assert_eq!(ledger.detail().map(|b| b.customer_name()), Some("C"));
}

#[test]
fn load_history_tolerates_missing_and_malformed_data() {
    let mut ledger = Ledger::new(MemoryStore::new());
    ledger.load_history();
    assert!(ledger.history().is_empty());

    let mut ledger = Ledger::new(MemoryStore::with_body("{not json"));
    ledger.load_history();
    assert!(ledger.history().is_empty());

    let mut ledger = Ledger::new(MemoryStore::with_body(r#"{"bills": 3}"#));
    ledger.load_history();
    assert!(ledger.history().is_empty());
}

#[test]
fn reopened_ledger_sees_saved_bills() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["Acme"]);
    let body = ledger.store().body().unwrap().to_string();

    let reopened = Ledger::open(MemoryStore::with_body(body), "KG");
    assert_eq!(reopened.history(), ledger.history());
    assert_eq!(reopened.line_items().len(), 1);
}

#[test]
fn reload_drops_pending_history_deletion() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["Acme"]);
    ledger.request_history_deletion(0).unwrap();

    let mut other = two_item_ledger();
    save_named(&mut other, &["Globex", "Acme"]);
    let body = other.store().body().unwrap().to_string();
    ledger.store_mut().set_body(body);
    ledger.load_history();

    assert!(ledger.pending_deletion().is_none());
    assert_eq!(ledger.confirm_deletion().unwrap(), DeletionOutcome::Cancelled);
    let names: Vec<&str> = ledger.history().iter().map(|b| b.customer_name()).collect();
    assert_eq!(names, vec!["Globex", "Acme"]);
}

#[test]
fn pending_history_deletion_records_the_bill() {
    let mut ledger = two_item_ledger();
    save_named(&mut ledger, &["A", "B"]);
    ledger.request_history_deletion(1).unwrap();
    match ledger.pending_deletion() {
        Some(PendingDeletion::HistoryEntry {
            index,
            customer_name,
            saved_at,
        }) => {
            assert_eq!(*index, 1);
            assert_eq!(customer_name, "B");
            assert_eq!(*saved_at, ledger.history()[1].saved_at());
        }
        other => panic!("unexpected pending deletion {:?}", other),
    }
}

#[test]
fn unreadable_history_is_kept_aside() {
    let mut ledger = Ledger::new(MemoryStore::with_body("{not json"));
    ledger.load_history();
    assert!(ledger.history().is_empty());
    assert_eq!(ledger.store().unreadable(), Some("{not json"));

    ledger.save_bill("Acme").unwrap();
    assert_eq!(ledger.store().unreadable(), Some("{not json"));
}
