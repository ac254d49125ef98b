// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use coinkeep::ledger::rates;
use coinkeep::utils::set_base_currency;
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

fn put(conn: &Connection, day: &str, base: &str, quote: &str, rate: &str) {
    conn.execute(
        "INSERT INTO fx_rates(date, base, quote, rate) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![day, base, quote, rate],
    )
    .unwrap();
}

#[test]
fn identity_needs_no_stored_rate() {
    let conn = setup();
    let r = rates::rate(&conn, date("2025-01-01"), "EUR", "EUR").unwrap();
    assert_eq!(r, Some(Decimal::ONE));
}

#[test]
fn direct_pair_wins() {
    let conn = setup();
    put(&conn, "2025-01-01", "EUR", "USD", "1.1");
    let r = rates::rate(&conn, date("2025-01-02"), "EUR", "USD").unwrap();
    assert_eq!(r, Some(dec("1.1")));
}

#[test]
fn inverse_pair_is_reciprocated() {
    let conn = setup();
    put(&conn, "2025-01-01", "USD", "EUR", "0.8");
    let r = rates::rate(&conn, date("2025-01-02"), "EUR", "USD").unwrap();
    assert_eq!(r, Some(dec("1.25")));
}

#[test]
fn triangulates_through_the_base_currency() {
    let conn = setup();
    set_base_currency(&conn, "USD").unwrap();
    put(&conn, "2025-01-01", "USD", "EUR", "0.8");
    put(&conn, "2025-01-01", "USD", "GBP", "0.5");
    // EUR -> USD -> GBP = (1/0.8) * 0.5
    let r = rates::rate(&conn, date("2025-01-02"), "EUR", "GBP").unwrap();
    assert_eq!(r, Some(dec("0.625")));
}

#[test]
fn rates_dated_after_the_lookup_are_ignored() {
    let conn = setup();
    put(&conn, "2025-01-10", "EUR", "USD", "1.3");
    assert_eq!(
        rates::rate(&conn, date("2025-01-05"), "EUR", "USD").unwrap(),
        None
    );
    // The most recent on-or-before rate wins over older ones.
    put(&conn, "2025-01-01", "EUR", "USD", "1.1");
    put(&conn, "2025-01-04", "EUR", "USD", "1.2");
    assert_eq!(
        rates::rate(&conn, date("2025-01-05"), "EUR", "USD").unwrap(),
        Some(dec("1.2"))
    );
}

#[test]
fn no_path_means_none() {
    let conn = setup();
    assert_eq!(
        rates::rate(&conn, date("2025-01-01"), "EUR", "JPY").unwrap(),
        None
    );
}

#[test]
fn zero_rates_are_unusable() {
    let conn = setup();
    put(&conn, "2025-01-01", "EUR", "USD", "0");
    assert_eq!(
        rates::rate(&conn, date("2025-01-02"), "EUR", "USD").unwrap(),
        None
    );
}

#[test]
fn convert_applies_the_multiplier() {
    let conn = setup();
    put(&conn, "2025-01-01", "EUR", "USD", "1.1");
    let v = rates::convert(&conn, date("2025-01-02"), dec("200"), "EUR", "USD").unwrap();
    assert_eq!(v, Some(dec("220.0")));
}
