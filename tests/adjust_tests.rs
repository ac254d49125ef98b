// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use coinkeep::errors::LedgerError;
use coinkeep::ledger::adjust::apply_cash_adjustment;
use coinkeep::ledger::events::{Change, ChangeBus};
use coinkeep::ledger::store;
use coinkeep::ledger::transactions::{NewTransaction, add_transaction};
use coinkeep::models::TransactionKind;
use coinkeep::utils::active_profile;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    coinkeep::db::init(&mut conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn balance(conn: &Connection, profile: i64, wallet: i64) -> Decimal {
    store::get_wallet(conn, profile, wallet)
        .unwrap()
        .current_balance
}

#[test]
fn surplus_count_records_an_income_adjustment() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("100")).unwrap();

    let rx = bus.subscribe();
    let adj = apply_cash_adjustment(
        &mut conn,
        &bus,
        profile,
        w.id,
        dec("112.50"),
        Some("found in coat pocket".into()),
        date("2025-04-01"),
    )
    .unwrap();

    assert_eq!(adj.previous_balance, dec("100"));
    assert_eq!(adj.new_balance, dec("112.50"));
    assert_eq!(adj.transaction.kind, TransactionKind::Income);
    assert_eq!(adj.transaction.amount, dec("12.50"));
    assert_eq!(adj.transaction.subtype.as_deref(), Some("cash_adjustment"));
    assert_eq!(
        adj.transaction.description.as_deref(),
        Some("found in coat pocket")
    );
    assert_eq!(balance(&conn, profile, w.id), dec("112.50"));
    assert_eq!(rx.try_recv(), Ok(Change::Transactions));

    // Filed under the Adjustments category.
    let cat: String = conn
        .query_row(
            "SELECT c.name FROM transactions t JOIN categories c ON t.category_id=c.id WHERE t.id=?1",
            rusqlite::params![adj.transaction.id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(cat, "Adjustments");
}

#[test]
fn shortfall_count_records_an_expense_adjustment() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("100.00")).unwrap();

    let adj = apply_cash_adjustment(
        &mut conn,
        &bus,
        profile,
        w.id,
        dec("85.50"),
        None,
        date("2025-04-01"),
    )
    .unwrap();

    assert_eq!(adj.transaction.kind, TransactionKind::Expense);
    assert_eq!(adj.transaction.amount, dec("14.50"));
    assert!(adj.transaction.description.is_some());
    // The count closes the gap exactly, not approximately.
    assert_eq!(balance(&conn, profile, w.id), dec("85.50"));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn matching_count_is_a_soft_no_difference() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let rx = bus.subscribe();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("100")).unwrap();

    // Within the 0.001 tolerance.
    let err = apply_cash_adjustment(
        &mut conn,
        &bus,
        profile,
        w.id,
        dec("100.0005"),
        None,
        date("2025-04-01"),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::NoDifference));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(balance(&conn, profile, w.id), dec("100"));
    assert!(rx.try_recv().is_err());
}

#[test]
fn adjustment_aligns_even_a_drifted_cache_with_the_count() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("100")).unwrap();
    // The cache lies; history still says 100.
    conn.execute(
        "UPDATE wallets SET current_balance='42' WHERE id=?1",
        rusqlite::params![w.id],
    )
    .unwrap();

    let adj = apply_cash_adjustment(
        &mut conn,
        &bus,
        profile,
        w.id,
        dec("90"),
        None,
        date("2025-04-01"),
    )
    .unwrap();

    // The gap is measured against recomputed history, not the stale cache.
    assert_eq!(adj.previous_balance, dec("100"));
    assert_eq!(adj.transaction.amount, dec("10"));
    assert_eq!(balance(&conn, profile, w.id), dec("90"));
}

#[test]
fn adjustment_is_ordinary_history_for_later_recomputation() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("50")).unwrap();
    apply_cash_adjustment(
        &mut conn,
        &bus,
        profile,
        w.id,
        dec("75"),
        None,
        date("2025-04-01"),
    )
    .unwrap();

    // A later ordinary transaction folds on top of the adjustment.
    add_transaction(
        &mut conn,
        &bus,
        profile,
        NewTransaction {
            wallet_id: Some(w.id),
            kind: TransactionKind::Expense,
            amount: dec("25"),
            currency: "EUR".into(),
            date: date("2025-04-02"),
            category_id: None,
            description: None,
            subtype: None,
        },
    )
    .unwrap();
    assert_eq!(balance(&conn, profile, w.id), dec("50"));
}
