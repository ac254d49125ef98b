// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use crate::errors::LedgerResult;
use crate::ledger::store;
use crate::models::Wallet;

/// Recomputes a wallet's balance from its full history and rewrites the
/// cached `current_balance`.
///
/// Balances are never adjusted incrementally. Every mutation that touches a
/// wallet calls this instead, so a correct write repairs whatever drift an
/// earlier crash or bug left behind. Running it twice in a row yields the
/// same value and is always safe.
pub fn recalculate_balance(
    conn: &Connection,
    profile_id: i64,
    wallet_id: i64,
) -> LedgerResult<Decimal> {
    let wallet = store::get_wallet(conn, profile_id, wallet_id)?;
    let balance = fold_history(conn, &wallet)?;
    store::write_wallet_balance(conn, profile_id, wallet_id, balance)?;
    Ok(balance)
}

/// Same fold as [`recalculate_balance`] but read-only. Used where the true
/// value is needed without committing a cache write, e.g. drift audits and
/// the no-op check of cash adjustments.
pub fn compute_balance(
    conn: &Connection,
    profile_id: i64,
    wallet_id: i64,
) -> LedgerResult<Decimal> {
    let wallet = store::get_wallet(conn, profile_id, wallet_id)?;
    fold_history(conn, &wallet)
}

/// initial_balance
///   + income - expense over the wallet's transactions
///   - outgoing transfer amounts
///   + incoming transfer credits (converted amount when captured).
fn fold_history(conn: &Connection, wallet: &Wallet) -> LedgerResult<Decimal> {
    let mut balance = wallet.initial_balance;

    let mut stmt = conn.prepare(
        "SELECT kind, amount FROM transactions WHERE profile_id=?1 AND wallet_id=?2",
    )?;
    let mut rows = stmt.query(params![wallet.profile_id, wallet.id])?;
    while let Some(row) = rows.next()? {
        let kind = store::kind_from_sql(row, 0)?;
        let amount = store::text_decimal(row, 1)?;
        balance += kind.signed(amount);
    }

    let mut stmt = conn.prepare(
        "SELECT amount FROM transfers WHERE profile_id=?1 AND from_wallet_id=?2",
    )?;
    let mut rows = stmt.query(params![wallet.profile_id, wallet.id])?;
    while let Some(row) = rows.next()? {
        balance -= store::text_decimal(row, 0)?;
    }

    let mut stmt = conn.prepare(
        "SELECT amount, converted_amount FROM transfers WHERE profile_id=?1 AND to_wallet_id=?2",
    )?;
    let mut rows = stmt.query(params![wallet.profile_id, wallet.id])?;
    while let Some(row) = rows.next()? {
        let amount = store::text_decimal(row, 0)?;
        let converted = store::opt_text_decimal(row, 1)?;
        balance += converted.unwrap_or(amount);
    }

    Ok(balance)
}
