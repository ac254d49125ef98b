// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

// Row-level access to the ledger store. Every query is scoped to a profile;
// nothing in here recomputes balances or publishes change events, that is
// the job of the operation modules sitting on top.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::errors::{LedgerError, LedgerResult};
use crate::models::{
    Frequency, ScheduledTransfer, Transaction, TransactionKind, Transfer, Wallet,
};

/// Category every cash-count adjustment lands in.
pub const ADJUSTMENTS_CATEGORY: &str = "Adjustments";

pub(crate) fn text_decimal(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn opt_text_decimal(row: &Row, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = row.get(idx)?;
    match s {
        Some(s) => s
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

pub(crate) fn kind_from_sql(row: &Row, idx: usize) -> rusqlite::Result<TransactionKind> {
    let s: String = row.get(idx)?;
    TransactionKind::parse(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn frequency_from_sql(row: &Row, idx: usize) -> rusqlite::Result<Frequency> {
    let s: String = row.get(idx)?;
    Frequency::parse(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

// ---------------------------------------------------------------------------
// Wallets

fn wallet_from_row(row: &Row) -> rusqlite::Result<Wallet> {
    Ok(Wallet {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        name: row.get(2)?,
        currency: row.get(3)?,
        initial_balance: text_decimal(row, 4)?,
        current_balance: text_decimal(row, 5)?,
    })
}

const WALLET_COLS: &str =
    "id, profile_id, name, currency, initial_balance, current_balance";

pub fn insert_wallet(
    conn: &Connection,
    profile_id: i64,
    name: &str,
    currency: &str,
    initial_balance: Decimal,
) -> LedgerResult<Wallet> {
    // A fresh wallet has no history, so the cache starts at the baseline.
    conn.execute(
        "INSERT INTO wallets(profile_id, name, currency, initial_balance, current_balance)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![profile_id, name, currency, initial_balance.to_string()],
    )?;
    get_wallet(conn, profile_id, conn.last_insert_rowid())
}

pub fn get_wallet(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<Wallet> {
    let sql = format!("SELECT {WALLET_COLS} FROM wallets WHERE id=?1 AND profile_id=?2");
    conn.query_row(&sql, params![id, profile_id], wallet_from_row)
        .optional()?
        .ok_or_else(|| LedgerError::wallet_not_found(id))
}

pub fn list_wallets(conn: &Connection, profile_id: i64) -> LedgerResult<Vec<Wallet>> {
    let sql = format!("SELECT {WALLET_COLS} FROM wallets WHERE profile_id=?1 ORDER BY name");
    let mut stmt = conn.prepare(&sql)?;
    let wallets = stmt
        .query_map(params![profile_id], wallet_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(wallets)
}

pub fn delete_wallet(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<()> {
    // Fails on FK RESTRICT while history references the wallet.
    let n = conn.execute(
        "DELETE FROM wallets WHERE id=?1 AND profile_id=?2",
        params![id, profile_id],
    )?;
    if n == 0 {
        return Err(LedgerError::wallet_not_found(id));
    }
    Ok(())
}

/// The only write path for `current_balance`. Restricted to this crate so
/// the cache can only ever be rewritten by reconciliation.
pub(crate) fn write_wallet_balance(
    conn: &Connection,
    profile_id: i64,
    wallet_id: i64,
    balance: Decimal,
) -> LedgerResult<()> {
    let n = conn.execute(
        "UPDATE wallets SET current_balance=?1 WHERE id=?2 AND profile_id=?3",
        params![balance.to_string(), wallet_id, profile_id],
    )?;
    if n == 0 {
        return Err(LedgerError::wallet_not_found(wallet_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Categories

pub fn ensure_category(conn: &Connection, name: &str) -> LedgerResult<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO categories(name) VALUES (?1)",
        params![name],
    )?;
    let id = conn.query_row(
        "SELECT id FROM categories WHERE name=?1",
        params![name],
        |r| r.get(0),
    )?;
    Ok(id)
}

// ---------------------------------------------------------------------------
// Transactions

/// Write shape for a new transaction. `amount` is a positive scalar.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub wallet_id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub subtype: Option<String>,
}

fn transaction_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        wallet_id: row.get(2)?,
        kind: kind_from_sql(row, 3)?,
        amount: text_decimal(row, 4)?,
        currency: row.get(5)?,
        date: row.get(6)?,
        category_id: row.get(7)?,
        description: row.get(8)?,
        subtype: row.get(9)?,
    })
}

const TRANSACTION_COLS: &str =
    "id, profile_id, wallet_id, kind, amount, currency, date, category_id, description, subtype";

pub fn insert_transaction(
    conn: &Connection,
    profile_id: i64,
    new: &NewTransaction,
) -> LedgerResult<Transaction> {
    conn.execute(
        "INSERT INTO transactions(profile_id, wallet_id, kind, amount, currency, date,
                                  category_id, description, subtype)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            profile_id,
            new.wallet_id,
            new.kind.as_str(),
            new.amount.to_string(),
            new.currency,
            new.date.to_string(),
            new.category_id,
            new.description,
            new.subtype
        ],
    )?;
    get_transaction(conn, profile_id, conn.last_insert_rowid())
}

pub fn get_transaction(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<Transaction> {
    let sql = format!("SELECT {TRANSACTION_COLS} FROM transactions WHERE id=?1 AND profile_id=?2");
    conn.query_row(&sql, params![id, profile_id], transaction_from_row)
        .optional()?
        .ok_or_else(|| LedgerError::transaction_not_found(id))
}

pub fn update_transaction_row(
    conn: &Connection,
    profile_id: i64,
    t: &Transaction,
) -> LedgerResult<()> {
    let n = conn.execute(
        "UPDATE transactions
         SET wallet_id=?1, kind=?2, amount=?3, currency=?4, date=?5,
             category_id=?6, description=?7, subtype=?8
         WHERE id=?9 AND profile_id=?10",
        params![
            t.wallet_id,
            t.kind.as_str(),
            t.amount.to_string(),
            t.currency,
            t.date.to_string(),
            t.category_id,
            t.description,
            t.subtype,
            t.id,
            profile_id
        ],
    )?;
    if n == 0 {
        return Err(LedgerError::transaction_not_found(t.id));
    }
    Ok(())
}

pub fn delete_transaction_row(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<()> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND profile_id=?2",
        params![id, profile_id],
    )?;
    if n == 0 {
        return Err(LedgerError::transaction_not_found(id));
    }
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub wallet_id: Option<i64>,
    /// Only rows with no wallet at all.
    pub unassigned: bool,
    pub category_id: Option<i64>,
    pub kind: Option<TransactionKind>,
    /// "YYYY-MM"
    pub month: Option<String>,
    pub limit: Option<u32>,
}

pub fn list_transactions(
    conn: &Connection,
    profile_id: i64,
    filter: &TransactionFilter,
) -> LedgerResult<Vec<Transaction>> {
    let mut sql = format!(
        "SELECT {TRANSACTION_COLS} FROM transactions WHERE profile_id=?"
    );
    let mut params_vec: Vec<String> = vec![profile_id.to_string()];

    if let Some(wid) = filter.wallet_id {
        sql.push_str(" AND wallet_id=?");
        params_vec.push(wid.to_string());
    }
    if filter.unassigned {
        sql.push_str(" AND wallet_id IS NULL");
    }
    if let Some(cid) = filter.category_id {
        sql.push_str(" AND category_id=?");
        params_vec.push(cid.to_string());
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind=?");
        params_vec.push(kind.as_str().to_string());
    }
    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.clone());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let refs: Vec<&dyn rusqlite::ToSql> =
        params_vec.iter().map(|s| s as &dyn rusqlite::ToSql).collect();
    let rows = stmt
        .query_map(rusqlite::params_from_iter(refs), transaction_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Transfers

/// Write shape for a new transfer. `amount` is denominated in the source
/// wallet's currency; the destination-side value is decided by the caller.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub from_wallet_id: i64,
    pub to_wallet_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

fn transfer_from_row(row: &Row) -> rusqlite::Result<Transfer> {
    Ok(Transfer {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        from_wallet_id: row.get(2)?,
        to_wallet_id: row.get(3)?,
        amount: text_decimal(row, 4)?,
        currency: row.get(5)?,
        converted_amount: opt_text_decimal(row, 6)?,
        date: row.get(7)?,
        description: row.get(8)?,
    })
}

const TRANSFER_COLS: &str = "id, profile_id, from_wallet_id, to_wallet_id, amount, currency, \
                             converted_amount, date, description";

pub fn insert_transfer(
    conn: &Connection,
    profile_id: i64,
    new: &NewTransfer,
    currency: &str,
    converted_amount: Option<Decimal>,
) -> LedgerResult<Transfer> {
    conn.execute(
        "INSERT INTO transfers(profile_id, from_wallet_id, to_wallet_id, amount, currency,
                               converted_amount, date, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            profile_id,
            new.from_wallet_id,
            new.to_wallet_id,
            new.amount.to_string(),
            currency,
            converted_amount.map(|d| d.to_string()),
            new.date.to_string(),
            new.description
        ],
    )?;
    get_transfer(conn, profile_id, conn.last_insert_rowid())
}

pub fn get_transfer(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<Transfer> {
    let sql = format!("SELECT {TRANSFER_COLS} FROM transfers WHERE id=?1 AND profile_id=?2");
    conn.query_row(&sql, params![id, profile_id], transfer_from_row)
        .optional()?
        .ok_or_else(|| LedgerError::transfer_not_found(id))
}

pub fn update_transfer_row(conn: &Connection, profile_id: i64, t: &Transfer) -> LedgerResult<()> {
    let n = conn.execute(
        "UPDATE transfers
         SET from_wallet_id=?1, to_wallet_id=?2, amount=?3, currency=?4,
             converted_amount=?5, date=?6, description=?7
         WHERE id=?8 AND profile_id=?9",
        params![
            t.from_wallet_id,
            t.to_wallet_id,
            t.amount.to_string(),
            t.currency,
            t.converted_amount.map(|d| d.to_string()),
            t.date.to_string(),
            t.description,
            t.id,
            profile_id
        ],
    )?;
    if n == 0 {
        return Err(LedgerError::transfer_not_found(t.id));
    }
    Ok(())
}

pub fn delete_transfer_row(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<()> {
    let n = conn.execute(
        "DELETE FROM transfers WHERE id=?1 AND profile_id=?2",
        params![id, profile_id],
    )?;
    if n == 0 {
        return Err(LedgerError::transfer_not_found(id));
    }
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct TransferFilter {
    /// Matches either leg.
    pub wallet_id: Option<i64>,
    /// "YYYY-MM"
    pub month: Option<String>,
    pub limit: Option<u32>,
}

pub fn list_transfers(
    conn: &Connection,
    profile_id: i64,
    filter: &TransferFilter,
) -> LedgerResult<Vec<Transfer>> {
    let mut sql = format!("SELECT {TRANSFER_COLS} FROM transfers WHERE profile_id=?");
    let mut params_vec: Vec<String> = vec![profile_id.to_string()];

    if let Some(wid) = filter.wallet_id {
        sql.push_str(" AND (from_wallet_id=? OR to_wallet_id=?)");
        params_vec.push(wid.to_string());
        params_vec.push(wid.to_string());
    }
    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.clone());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let refs: Vec<&dyn rusqlite::ToSql> =
        params_vec.iter().map(|s| s as &dyn rusqlite::ToSql).collect();
    let rows = stmt
        .query_map(rusqlite::params_from_iter(refs), transfer_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Scheduled transfers

#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub from_wallet_id: i64,
    pub to_wallet_id: i64,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub day_of_week: Option<u32>,
    pub day_of_month: Option<u32>,
    pub total_occurrences: Option<u32>,
    pub description: Option<String>,
}

fn schedule_from_row(row: &Row) -> rusqlite::Result<ScheduledTransfer> {
    Ok(ScheduledTransfer {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        from_wallet_id: row.get(2)?,
        to_wallet_id: row.get(3)?,
        amount: text_decimal(row, 4)?,
        currency: row.get(5)?,
        frequency: frequency_from_sql(row, 6)?,
        day_of_week: row.get(7)?,
        day_of_month: row.get(8)?,
        next_run_date: row.get(9)?,
        last_run_date: row.get(10)?,
        is_active: row.get(11)?,
        total_occurrences: row.get(12)?,
        remaining_occurrences: row.get(13)?,
        description: row.get(14)?,
    })
}

const SCHEDULE_COLS: &str = "id, profile_id, from_wallet_id, to_wallet_id, amount, currency, \
                             frequency, day_of_week, day_of_month, next_run_date, last_run_date, \
                             is_active, total_occurrences, remaining_occurrences, description";

pub fn insert_schedule(
    conn: &Connection,
    profile_id: i64,
    new: &NewSchedule,
    currency: &str,
    next_run_date: NaiveDate,
) -> LedgerResult<ScheduledTransfer> {
    conn.execute(
        "INSERT INTO scheduled_transfers(profile_id, from_wallet_id, to_wallet_id, amount,
                                         currency, frequency, day_of_week, day_of_month,
                                         next_run_date, total_occurrences, remaining_occurrences,
                                         description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?11)",
        params![
            profile_id,
            new.from_wallet_id,
            new.to_wallet_id,
            new.amount.to_string(),
            currency,
            new.frequency.as_str(),
            new.day_of_week,
            new.day_of_month,
            next_run_date.to_string(),
            new.total_occurrences,
            new.description
        ],
    )?;
    get_schedule(conn, profile_id, conn.last_insert_rowid())
}

pub fn get_schedule(
    conn: &Connection,
    profile_id: i64,
    id: i64,
) -> LedgerResult<ScheduledTransfer> {
    let sql =
        format!("SELECT {SCHEDULE_COLS} FROM scheduled_transfers WHERE id=?1 AND profile_id=?2");
    conn.query_row(&sql, params![id, profile_id], schedule_from_row)
        .optional()?
        .ok_or_else(|| LedgerError::schedule_not_found(id))
}

pub fn list_schedules(
    conn: &Connection,
    profile_id: i64,
    only_active: bool,
) -> LedgerResult<Vec<ScheduledTransfer>> {
    let mut sql =
        format!("SELECT {SCHEDULE_COLS} FROM scheduled_transfers WHERE profile_id=?1");
    if only_active {
        sql.push_str(" AND is_active=1");
    }
    sql.push_str(" ORDER BY next_run_date, id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![profile_id], schedule_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Active schedules whose next run falls on or before `today`. Exhausted
/// schedules never qualify, even if something flipped them back on by hand.
pub fn list_due_schedules(
    conn: &Connection,
    profile_id: i64,
    today: NaiveDate,
) -> LedgerResult<Vec<ScheduledTransfer>> {
    let sql = format!(
        "SELECT {SCHEDULE_COLS} FROM scheduled_transfers
         WHERE profile_id=?1 AND is_active=1 AND next_run_date<=?2
           AND (remaining_occurrences IS NULL OR remaining_occurrences > 0)
         ORDER BY next_run_date, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![profile_id, today.to_string()], schedule_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn set_schedule_active(
    conn: &Connection,
    profile_id: i64,
    id: i64,
    active: bool,
) -> LedgerResult<()> {
    let n = conn.execute(
        "UPDATE scheduled_transfers SET is_active=?1 WHERE id=?2 AND profile_id=?3",
        params![active, id, profile_id],
    )?;
    if n == 0 {
        return Err(LedgerError::schedule_not_found(id));
    }
    Ok(())
}

/// Moves a schedule past a materialized occurrence. `next_run_date` is only
/// rewritten while the schedule stays active; an exhausted schedule keeps its
/// last computed value for inspection.
pub fn advance_schedule(
    conn: &Connection,
    profile_id: i64,
    id: i64,
    last_run_date: NaiveDate,
    next_run_date: Option<NaiveDate>,
    remaining_occurrences: Option<u32>,
    is_active: bool,
) -> LedgerResult<()> {
    let n = conn.execute(
        "UPDATE scheduled_transfers
         SET last_run_date=?1,
             next_run_date=COALESCE(?2, next_run_date),
             remaining_occurrences=?3,
             is_active=?4
         WHERE id=?5 AND profile_id=?6",
        params![
            last_run_date.to_string(),
            next_run_date.map(|d| d.to_string()),
            remaining_occurrences,
            is_active,
            id,
            profile_id
        ],
    )?;
    if n == 0 {
        return Err(LedgerError::schedule_not_found(id));
    }
    Ok(())
}

pub fn delete_schedule_row(conn: &Connection, profile_id: i64, id: i64) -> LedgerResult<()> {
    let n = conn.execute(
        "DELETE FROM scheduled_transfers WHERE id=?1 AND profile_id=?2",
        params![id, profile_id],
    )?;
    if n == 0 {
        return Err(LedgerError::schedule_not_found(id));
    }
    Ok(())
}
