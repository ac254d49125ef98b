// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::balance;
use crate::ledger::events::{Change, ChangeBus};
use crate::ledger::store;
use crate::ledger::store::NewTransaction;
use crate::models::{Transaction, TransactionKind};

/// Differences smaller than this are treated as "nothing to fix".
pub fn adjustment_epsilon() -> Decimal {
    Decimal::new(1, 3) // 0.001
}

/// Outcome of a cash count: the audit transaction plus the balance on both
/// sides of it.
#[derive(Debug, Clone, Serialize)]
pub struct CashAdjustment {
    pub transaction: Transaction,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
}

/// Aligns a wallet with a physically counted balance.
///
/// The gap is closed by recording an ordinary transaction (income when the
/// count exceeds the books, expense otherwise) tagged with the
/// "cash_adjustment" subtype and filed under the Adjustments category, so
/// the correction stays visible in history instead of silently editing the
/// balance. The before-value is recomputed from history rather than read
/// from the cache; afterwards the stored balance equals the counted one
/// even if the cache had drifted.
///
/// Returns [`LedgerError::NoDifference`] without writing anything when the
/// count is within [`adjustment_epsilon`] of the books.
pub fn apply_cash_adjustment(
    conn: &mut Connection,
    bus: &ChangeBus,
    profile_id: i64,
    wallet_id: i64,
    counted_balance: Decimal,
    reason: Option<String>,
    today: NaiveDate,
) -> LedgerResult<CashAdjustment> {
    let wallet = store::get_wallet(conn, profile_id, wallet_id)?;
    let previous_balance = balance::compute_balance(conn, profile_id, wallet_id)?;
    let difference = counted_balance - previous_balance;
    if difference.abs() < adjustment_epsilon() {
        return Err(LedgerError::NoDifference);
    }
    let kind = if difference > Decimal::ZERO {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    };

    let tx = conn.transaction()?;
    let category_id = store::ensure_category(&tx, store::ADJUSTMENTS_CATEGORY)?;
    let new = NewTransaction {
        wallet_id: Some(wallet_id),
        kind,
        amount: difference.abs(),
        currency: wallet.currency.clone(),
        date: today,
        category_id: Some(category_id),
        description: reason.or_else(|| Some("Cash count adjustment".to_string())),
        subtype: Some("cash_adjustment".to_string()),
    };
    let created = store::insert_transaction(&tx, profile_id, &new)?;
    let new_balance = balance::recalculate_balance(&tx, profile_id, wallet_id)?;
    tx.commit()?;
    bus.publish(Change::Transactions);
    Ok(CashAdjustment {
        transaction: created,
        previous_balance,
        new_balance,
    })
}
