// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;

use crate::errors::LedgerResult;
use crate::ledger::balance::recalculate_balance;
use crate::ledger::events::{Change, ChangeBus};
use crate::ledger::store;
use crate::models::Transaction;

pub use crate::ledger::store::{NewTransaction, TransactionFilter};

/// Records a transaction and reconciles the tagged wallet, all in one
/// storage transaction. Unassigned rows (no wallet) skip reconciliation.
pub fn add_transaction(
    conn: &mut Connection,
    bus: &ChangeBus,
    profile_id: i64,
    new: NewTransaction,
) -> LedgerResult<Transaction> {
    if let Some(wid) = new.wallet_id {
        store::get_wallet(conn, profile_id, wid)?;
    }
    let tx = conn.transaction()?;
    let created = store::insert_transaction(&tx, profile_id, &new)?;
    if let Some(wid) = created.wallet_id {
        recalculate_balance(&tx, profile_id, wid)?;
    }
    tx.commit()?;
    bus.publish(Change::Transactions);
    Ok(created)
}

/// Rewrites a transaction to the given state and reconciles every wallet the
/// edit touches. Moving a transaction between wallets reconciles both the
/// old and the new one; the one it left would otherwise keep a stale cache.
pub fn update_transaction(
    conn: &mut Connection,
    bus: &ChangeBus,
    profile_id: i64,
    updated: &Transaction,
) -> LedgerResult<Transaction> {
    let old = store::get_transaction(conn, profile_id, updated.id)?;
    let mut row = updated.clone();
    if let Some(wid) = row.wallet_id {
        // Assigned rows are denominated in their wallet's currency.
        let wallet = store::get_wallet(conn, profile_id, wid)?;
        row.currency = wallet.currency;
    }
    let tx = conn.transaction()?;
    store::update_transaction_row(&tx, profile_id, &row)?;
    for wid in affected_wallets(&[old.wallet_id, row.wallet_id]) {
        recalculate_balance(&tx, profile_id, wid)?;
    }
    tx.commit()?;
    bus.publish(Change::Transactions);
    Ok(row)
}

/// Deletes a transaction and reconciles the wallet it counted toward.
/// Returns the removed row.
pub fn delete_transaction(
    conn: &mut Connection,
    bus: &ChangeBus,
    profile_id: i64,
    id: i64,
) -> LedgerResult<Transaction> {
    let old = store::get_transaction(conn, profile_id, id)?;
    let tx = conn.transaction()?;
    store::delete_transaction_row(&tx, profile_id, id)?;
    if let Some(wid) = old.wallet_id {
        recalculate_balance(&tx, profile_id, wid)?;
    }
    tx.commit()?;
    bus.publish(Change::Transactions);
    Ok(old)
}

pub fn get_transaction(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<Transaction> {
    store::get_transaction(conn, profile_id, id)
}

pub fn list_transactions(
    conn: &Connection,
    profile_id: i64,
    filter: &TransactionFilter,
) -> LedgerResult<Vec<Transaction>> {
    store::list_transactions(conn, profile_id, filter)
}

/// Distinct wallet ids out of a set of optional references, insertion order
/// preserved.
pub(crate) fn affected_wallets(ids: &[Option<i64>]) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::with_capacity(ids.len());
    for id in ids.iter().flatten() {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::affected_wallets;

    #[test]
    fn affected_wallets_dedupes_and_skips_none() {
        assert_eq!(
            affected_wallets(&[Some(2), None, Some(1), Some(2)]),
            vec![2, 1]
        );
        assert!(affected_wallets(&[None, None]).is_empty());
    }
}
