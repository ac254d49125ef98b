// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::balance::recalculate_balance;
use crate::ledger::events::{Change, ChangeBus};
use crate::ledger::transactions::affected_wallets;
use crate::ledger::{rates, store};
use crate::models::Transfer;

pub use crate::ledger::store::{NewTransfer, TransferFilter};

/// Moves money between two wallets of the same profile.
///
/// Same-wallet transfers are rejected before anything is written. When the
/// wallets disagree on currency, the rate for the transfer date is captured
/// into `converted_amount`; a missing rate is not an error, the transfer is
/// recorded without a converted amount and the destination is credited the
/// source amount at face value.
pub fn create_transfer(
    conn: &mut Connection,
    bus: &ChangeBus,
    profile_id: i64,
    new: NewTransfer,
) -> LedgerResult<Transfer> {
    if new.from_wallet_id == new.to_wallet_id {
        return Err(LedgerError::InvalidTransfer);
    }
    let from = store::get_wallet(conn, profile_id, new.from_wallet_id)?;
    let to = store::get_wallet(conn, profile_id, new.to_wallet_id)?;
    let converted = converted_amount(conn, &new, &from.currency, &to.currency)?;

    let tx = conn.transaction()?;
    let created = insert_and_reconcile(&tx, profile_id, &new, &from.currency, converted)?;
    tx.commit()?;
    bus.publish(Change::Transfers);
    Ok(created)
}

/// Insert plus both-leg reconciliation, inside the caller's storage
/// transaction. Shared with the scheduler so materialized transfers follow
/// the exact same path as manual ones.
pub(crate) fn insert_and_reconcile(
    conn: &Connection,
    profile_id: i64,
    new: &NewTransfer,
    currency: &str,
    converted: Option<Decimal>,
) -> LedgerResult<Transfer> {
    let created = store::insert_transfer(conn, profile_id, new, currency, converted)?;
    recalculate_balance(conn, profile_id, created.from_wallet_id)?;
    recalculate_balance(conn, profile_id, created.to_wallet_id)?;
    Ok(created)
}

/// Rewrites a transfer and reconciles the union of old and new wallets, up
/// to four when both endpoints move.
///
/// The conversion captured at creation is a historical record: edits never
/// look the rate table up again, no matter which fields move. The stored
/// `converted_amount` only changes when the caller hands in a replacement
/// value, or becomes NULL when the wallets end up sharing a currency.
pub fn update_transfer(
    conn: &mut Connection,
    bus: &ChangeBus,
    profile_id: i64,
    updated: &Transfer,
) -> LedgerResult<Transfer> {
    if updated.from_wallet_id == updated.to_wallet_id {
        return Err(LedgerError::InvalidTransfer);
    }
    let old = store::get_transfer(conn, profile_id, updated.id)?;
    let from = store::get_wallet(conn, profile_id, updated.from_wallet_id)?;
    let to = store::get_wallet(conn, profile_id, updated.to_wallet_id)?;

    let mut row = updated.clone();
    row.currency = from.currency.clone();
    row.converted_amount = if from.currency == to.currency {
        None
    } else {
        // An explicit value replaces the capture; None keeps the
        // authoritative historical one.
        updated.converted_amount.or(old.converted_amount)
    };

    let tx = conn.transaction()?;
    store::update_transfer_row(&tx, profile_id, &row)?;
    let touched = affected_wallets(&[
        Some(old.from_wallet_id),
        Some(old.to_wallet_id),
        Some(row.from_wallet_id),
        Some(row.to_wallet_id),
    ]);
    for wid in touched {
        recalculate_balance(&tx, profile_id, wid)?;
    }
    tx.commit()?;
    bus.publish(Change::Transfers);
    Ok(row)
}

/// Removes a transfer and reconciles both legs. Returns the removed row.
pub fn delete_transfer(
    conn: &mut Connection,
    bus: &ChangeBus,
    profile_id: i64,
    id: i64,
) -> LedgerResult<Transfer> {
    let old = store::get_transfer(conn, profile_id, id)?;
    let tx = conn.transaction()?;
    store::delete_transfer_row(&tx, profile_id, id)?;
    recalculate_balance(&tx, profile_id, old.from_wallet_id)?;
    recalculate_balance(&tx, profile_id, old.to_wallet_id)?;
    tx.commit()?;
    bus.publish(Change::Transfers);
    Ok(old)
}

pub fn get_transfer(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<Transfer> {
    store::get_transfer(conn, profile_id, id)
}

pub fn list_transfers(
    conn: &Connection,
    profile_id: i64,
    filter: &TransferFilter,
) -> LedgerResult<Vec<Transfer>> {
    store::list_transfers(conn, profile_id, filter)
}

fn converted_amount(
    conn: &Connection,
    new: &NewTransfer,
    from_currency: &str,
    to_currency: &str,
) -> LedgerResult<Option<Decimal>> {
    if from_currency == to_currency {
        return Ok(None);
    }
    Ok(rates::rate(conn, new.date, from_currency, to_currency)?.map(|r| new.amount * r))
}
