// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::errors::LedgerResult;
use crate::ledger::store;

/// Most recent stored rate for base/quote on or before `date`.
fn find_rate(
    conn: &Connection,
    date: NaiveDate,
    base: &str,
    quote: &str,
) -> LedgerResult<Option<Decimal>> {
    let mut stmt = conn.prepare(
        "SELECT rate FROM fx_rates
         WHERE base = ?1 AND quote = ?2 AND date <= ?3
         ORDER BY date DESC LIMIT 1",
    )?;
    let rate = stmt
        .query_row(params![base, quote, date.to_string()], |row| {
            store::text_decimal(row, 0)
        })
        .optional()?;
    // A zero rate is unusable as a multiplier or divisor.
    Ok(rate.filter(|r| !r.is_zero()))
}

fn hub_currency(conn: &Connection) -> LedgerResult<String> {
    let hub: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key = 'base_currency'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hub.unwrap_or_else(|| "USD".to_string()))
}

/// Multiplier that converts an amount in `from` into `to` as of `date`.
///
/// Resolution order: identity, direct pair, reciprocal of the inverse pair,
/// then triangulation through the configured base currency. Rates dated
/// after `date` are never used. Returns `Ok(None)` when no path exists;
/// callers decide what a missing rate means (transfers record no converted
/// amount rather than failing).
pub fn rate(
    conn: &Connection,
    date: NaiveDate,
    from: &str,
    to: &str,
) -> LedgerResult<Option<Decimal>> {
    if from == to {
        return Ok(Some(Decimal::ONE));
    }
    if let Some(direct) = find_rate(conn, date, from, to)? {
        return Ok(Some(direct));
    }
    if let Some(inverse) = find_rate(conn, date, to, from)? {
        return Ok(Some(Decimal::ONE / inverse));
    }
    // Triangulate from -> hub -> to. Each leg may itself be stored in either
    // direction.
    let hub = hub_currency(conn)?;
    if from == hub || to == hub {
        return Ok(None);
    }
    let from_to_hub = match find_rate(conn, date, from, &hub)? {
        Some(r) => Some(r),
        None => find_rate(conn, date, &hub, from)?.map(|r| Decimal::ONE / r),
    };
    let hub_to_to = match find_rate(conn, date, &hub, to)? {
        Some(r) => Some(r),
        None => find_rate(conn, date, to, &hub)?.map(|r| Decimal::ONE / r),
    };
    match (from_to_hub, hub_to_to) {
        (Some(a), Some(b)) => Ok(Some(a * b)),
        _ => Ok(None),
    }
}

/// Convenience wrapper used by reporting paths: converts `amount` when a
/// rate is available, otherwise returns `None`.
pub fn convert(
    conn: &Connection,
    date: NaiveDate,
    amount: Decimal,
    from: &str,
    to: &str,
) -> LedgerResult<Option<Decimal>> {
    Ok(rate(conn, date, from, to)?.map(|r| amount * r))
}
