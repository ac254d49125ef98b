// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use coinkeep::ledger::events::ChangeBus;
use coinkeep::ledger::transactions::{
    NewTransaction, TransactionFilter, add_transaction, delete_transaction, list_transactions,
};
use coinkeep::ledger::transfers::{NewTransfer, create_transfer};
use coinkeep::ledger::{balance, store};
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

fn new_tx(wallet_id: Option<i64>, kind: TransactionKind, amount: &str, day: &str) -> NewTransaction {
    NewTransaction {
        wallet_id,
        kind,
        amount: dec(amount),
        currency: "EUR".into(),
        date: date(day),
        category_id: None,
        description: None,
        subtype: None,
    }
}

#[test]
fn balance_is_initial_plus_signed_history() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("100")).unwrap();

    add_transaction(
        &mut conn,
        &bus,
        profile,
        new_tx(Some(w.id), TransactionKind::Income, "50", "2025-01-02"),
    )
    .unwrap();
    add_transaction(
        &mut conn,
        &bus,
        profile,
        new_tx(Some(w.id), TransactionKind::Expense, "20", "2025-01-03"),
    )
    .unwrap();

    let w = store::get_wallet(&conn, profile, w.id).unwrap();
    assert_eq!(w.current_balance, dec("130"));
    assert_eq!(
        balance::compute_balance(&conn, profile, w.id).unwrap(),
        dec("130")
    );
}

#[test]
fn reconciliation_heals_a_corrupted_cache() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("10")).unwrap();
    add_transaction(
        &mut conn,
        &bus,
        profile,
        new_tx(Some(w.id), TransactionKind::Income, "5", "2025-01-02"),
    )
    .unwrap();

    // Corrupt the cache behind the engine's back.
    conn.execute(
        "UPDATE wallets SET current_balance='9999' WHERE id=?1",
        rusqlite::params![w.id],
    )
    .unwrap();

    let healed = balance::recalculate_balance(&conn, profile, w.id).unwrap();
    assert_eq!(healed, dec("15"));
    let w = store::get_wallet(&conn, profile, w.id).unwrap();
    assert_eq!(w.current_balance, dec("15"));

    // Running it again changes nothing.
    assert_eq!(
        balance::recalculate_balance(&conn, profile, w.id).unwrap(),
        dec("15")
    );
}

#[test]
fn unassigned_transactions_touch_no_wallet() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("100")).unwrap();

    add_transaction(
        &mut conn,
        &bus,
        profile,
        new_tx(None, TransactionKind::Expense, "40", "2025-01-02"),
    )
    .unwrap();

    let w = store::get_wallet(&conn, profile, w.id).unwrap();
    assert_eq!(w.current_balance, dec("100"));
}

#[test]
fn deleting_a_transaction_restores_the_balance() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("100")).unwrap();
    let t = add_transaction(
        &mut conn,
        &bus,
        profile,
        new_tx(Some(w.id), TransactionKind::Expense, "30", "2025-01-02"),
    )
    .unwrap();
    assert_eq!(
        store::get_wallet(&conn, profile, w.id).unwrap().current_balance,
        dec("70")
    );

    delete_transaction(&mut conn, &bus, profile, t.id).unwrap();
    assert_eq!(
        store::get_wallet(&conn, profile, w.id).unwrap().current_balance,
        dec("100")
    );
}

#[test]
fn invariant_survives_a_mixed_sequence_of_operations() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("100")).unwrap();
    let other = store::insert_wallet(&conn, profile, "Savings", "EUR", dec("0")).unwrap();

    add_transaction(
        &mut conn,
        &bus,
        profile,
        new_tx(Some(w.id), TransactionKind::Income, "80", "2025-01-02"),
    )
    .unwrap();
    let doomed = add_transaction(
        &mut conn,
        &bus,
        profile,
        new_tx(Some(w.id), TransactionKind::Expense, "15", "2025-01-03"),
    )
    .unwrap();
    delete_transaction(&mut conn, &bus, profile, doomed.id).unwrap();
    create_transfer(
        &mut conn,
        &bus,
        profile,
        NewTransfer {
            from_wallet_id: w.id,
            to_wallet_id: other.id,
            amount: dec("30"),
            date: date("2025-01-04"),
            description: None,
        },
    )
    .unwrap();

    // current_balance == initial + signed transactions + transfer legs, and
    // an extra reconciliation pass does not move it.
    let filter = TransactionFilter {
        wallet_id: Some(w.id),
        ..Default::default()
    };
    let signed: Decimal = list_transactions(&conn, profile, &filter)
        .unwrap()
        .iter()
        .map(|t| t.signed_amount())
        .sum();
    let expected = dec("100") + signed - dec("30");
    assert_eq!(expected, dec("150"));
    assert_eq!(
        store::get_wallet(&conn, profile, w.id).unwrap().current_balance,
        expected
    );
    assert_eq!(
        balance::recalculate_balance(&conn, profile, w.id).unwrap(),
        expected
    );
}

#[test]
fn balances_are_scoped_to_their_profile() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let other = coinkeep::utils::ensure_profile(&conn, "partner").unwrap();
    let bus = ChangeBus::new();

    let mine = store::insert_wallet(&conn, profile, "Cash", "EUR", dec("0")).unwrap();
    let theirs = store::insert_wallet(&conn, other, "Cash", "EUR", dec("0")).unwrap();

    add_transaction(
        &mut conn,
        &bus,
        profile,
        new_tx(Some(mine.id), TransactionKind::Income, "25", "2025-01-02"),
    )
    .unwrap();

    assert_eq!(
        store::get_wallet(&conn, profile, mine.id).unwrap().current_balance,
        dec("25")
    );
    assert_eq!(
        store::get_wallet(&conn, other, theirs.id).unwrap().current_balance,
        dec("0")
    );
    // A wallet id from another profile is invisible here.
    assert!(store::get_wallet(&conn, profile, theirs.id).is_err());
}
