// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::errors::LedgerResult;
use crate::ledger::events::{Change, ChangeBus};
use crate::ledger::store;
use crate::models::Wallet;

pub fn create_wallet(
    conn: &Connection,
    bus: &ChangeBus,
    profile_id: i64,
    name: &str,
    currency: &str,
    initial_balance: Decimal,
) -> LedgerResult<Wallet> {
    let wallet = store::insert_wallet(conn, profile_id, name, currency, initial_balance)?;
    bus.publish(Change::Wallets);
    Ok(wallet)
}

/// Fails while transactions or transfers still reference the wallet; history
/// is never silently orphaned.
pub fn delete_wallet(
    conn: &Connection,
    bus: &ChangeBus,
    profile_id: i64,
    id: i64,
) -> LedgerResult<()> {
    store::delete_wallet(conn, profile_id, id)?;
    bus.publish(Change::Wallets);
    Ok(())
}

pub fn get_wallet(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<Wallet> {
    store::get_wallet(conn, profile_id, id)
}

pub fn list_wallets(conn: &Connection, profile_id: i64) -> LedgerResult<Vec<Wallet>> {
    store::list_wallets(conn, profile_id)
}
