// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use coinkeep::ledger::events::ChangeBus;
use coinkeep::ledger::store;
use coinkeep::ledger::transactions::{TransactionFilter, list_transactions};
use coinkeep::utils::active_profile;
use coinkeep::{cli, commands::transactions};
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

fn run_tx(conn: &mut Connection, bus: &ChangeBus, argv: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", m)) => transactions::handle(conn, bus, m),
        _ => panic!("no tx subcommand"),
    }
}

#[test]
fn add_via_cli_updates_the_wallet_balance() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Checking", "EUR", dec("100")).unwrap();

    run_tx(
        &mut conn,
        &bus,
        &[
            "coinkeep", "tx", "add", "--kind", "expense", "--amount", "25.50", "--date",
            "2025-01-02", "--wallet", "Checking",
        ],
    )
    .unwrap();

    let w = store::get_wallet(&conn, profile, w.id).unwrap();
    assert_eq!(w.current_balance, dec("74.50"));

    let rows = list_transactions(&conn, profile, &TransactionFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, dec("25.50"));
    // Assigned rows inherit their wallet's currency.
    assert_eq!(rows[0].currency, "EUR");
}

#[test]
fn unassigned_add_requires_an_explicit_currency() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();

    let res = run_tx(
        &mut conn,
        &bus,
        &[
            "coinkeep", "tx", "add", "--kind", "income", "--amount", "5", "--date", "2025-01-02",
        ],
    );
    assert!(res.is_err());

    run_tx(
        &mut conn,
        &bus,
        &[
            "coinkeep", "tx", "add", "--kind", "income", "--amount", "5", "--date", "2025-01-02",
            "--currency", "usd",
        ],
    )
    .unwrap();

    let rows = list_transactions(&conn, profile, &TransactionFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].wallet_id, None);
    assert_eq!(rows[0].currency, "USD");
}

#[test]
fn list_limit_respected() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    store::insert_wallet(&conn, profile, "Checking", "USD", dec("0")).unwrap();
    for day in ["2025-01-01", "2025-01-02", "2025-01-03"] {
        run_tx(
            &mut conn,
            &bus,
            &[
                "coinkeep", "tx", "add", "--kind", "expense", "--amount", "10", "--date", day,
                "--wallet", "Checking",
            ],
        )
        .unwrap();
    }

    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["coinkeep", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, date("2025-01-03"));
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn edit_moving_a_transaction_reconciles_both_wallets() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let a = store::insert_wallet(&conn, profile, "Wallet A", "USD", dec("100")).unwrap();
    let b = store::insert_wallet(&conn, profile, "Wallet B", "USD", dec("100")).unwrap();

    run_tx(
        &mut conn,
        &bus,
        &[
            "coinkeep", "tx", "add", "--kind", "expense", "--amount", "30", "--date",
            "2025-01-02", "--wallet", "Wallet A",
        ],
    )
    .unwrap();
    assert_eq!(
        store::get_wallet(&conn, profile, a.id).unwrap().current_balance,
        dec("70")
    );

    let id: i64 = conn
        .query_row("SELECT id FROM transactions", [], |r| r.get(0))
        .unwrap();
    let id_s = id.to_string();
    run_tx(
        &mut conn,
        &bus,
        &["coinkeep", "tx", "edit", id_s.as_str(), "--wallet", "Wallet B"],
    )
    .unwrap();

    assert_eq!(
        store::get_wallet(&conn, profile, a.id).unwrap().current_balance,
        dec("100")
    );
    assert_eq!(
        store::get_wallet(&conn, profile, b.id).unwrap().current_balance,
        dec("70")
    );
}

#[test]
fn removing_a_transaction_restores_the_balance() {
    let mut conn = setup();
    let profile = active_profile(&conn).unwrap();
    let bus = ChangeBus::new();
    let w = store::insert_wallet(&conn, profile, "Cash", "USD", dec("50")).unwrap();

    run_tx(
        &mut conn,
        &bus,
        &[
            "coinkeep", "tx", "add", "--kind", "income", "--amount", "20", "--date", "2025-01-02",
            "--wallet", "Cash",
        ],
    )
    .unwrap();
    assert_eq!(
        store::get_wallet(&conn, profile, w.id).unwrap().current_balance,
        dec("70")
    );

    let id: i64 = conn
        .query_row("SELECT id FROM transactions", [], |r| r.get(0))
        .unwrap();
    let id_s = id.to_string();
    run_tx(&mut conn, &bus, &["coinkeep", "tx", "rm", id_s.as_str()]).unwrap();

    assert_eq!(
        store::get_wallet(&conn, profile, w.id).unwrap().current_balance,
        dec("50")
    );
    let rows = list_transactions(&conn, profile, &TransactionFilter::default()).unwrap();
    assert!(rows.is_empty());
}
