// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use crate::ledger::events::ChangeBus;
use crate::ledger::transactions::{
    NewTransaction, TransactionFilter, add_transaction, delete_transaction, get_transaction,
    list_transactions, update_transaction,
};
use crate::models::{Transaction, TransactionKind};
use crate::utils::{
    active_profile, fmt_money, id_for_category, id_for_wallet, maybe_print_json, parse_date,
    parse_positive_decimal, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, bus: &ChangeBus, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, bus, sub)?,
        Some(("edit", sub)) => edit(conn, bus, sub)?,
        Some(("rm", sub)) => rm(conn, bus, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, bus: &ChangeBus, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let kind = TransactionKind::parse(sub.get_one::<String>("kind").unwrap())?;
    let amount = parse_positive_decimal(sub.get_one::<String>("amount").unwrap())?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;

    // Assigned rows take their wallet's currency; unassigned rows must say
    // what they are denominated in.
    let (wallet_id, currency) = match sub.get_one::<String>("wallet") {
        Some(name) => {
            let wid = id_for_wallet(conn, profile, name)?;
            let ccy: String = conn.query_row(
                "SELECT currency FROM wallets WHERE id=?1",
                rusqlite::params![wid],
                |r| r.get(0),
            )?;
            (Some(wid), ccy)
        }
        None => {
            let ccy = sub
                .get_one::<String>("currency")
                .context("--currency is required when no wallet is given")?;
            (None, ccy.to_uppercase())
        }
    };
    let category_id = match sub.get_one::<String>("category") {
        Some(c) => Some(id_for_category(conn, c)?),
        None => None,
    };

    let new = NewTransaction {
        wallet_id,
        kind,
        amount,
        currency,
        date,
        category_id,
        description: sub.get_one::<String>("desc").cloned(),
        subtype: None,
    };
    let t = add_transaction(conn, bus, profile, new)?;
    match sub.get_one::<String>("wallet") {
        Some(name) => println!(
            "Recorded {} {} on {} in '{}' (id {})",
            t.kind.as_str(),
            fmt_money(&t.amount, &t.currency),
            t.date,
            name,
            t.id
        ),
        None => println!(
            "Recorded unassigned {} {} on {} (id {})",
            t.kind.as_str(),
            fmt_money(&t.amount, &t.currency),
            t.date,
            t.id
        ),
    }
    Ok(())
}

fn edit(conn: &mut Connection, bus: &ChangeBus, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut t = get_transaction(conn, profile, id)?;

    if sub.get_flag("unassign") {
        t.wallet_id = None;
    } else if let Some(name) = sub.get_one::<String>("wallet") {
        t.wallet_id = Some(id_for_wallet(conn, profile, name)?);
    }
    if let Some(k) = sub.get_one::<String>("kind") {
        t.kind = TransactionKind::parse(k)?;
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        t.amount = parse_positive_decimal(a)?;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        t.date = parse_date(d)?;
    }
    if let Some(c) = sub.get_one::<String>("category") {
        t.category_id = Some(id_for_category(conn, c)?);
    }
    if let Some(n) = sub.get_one::<String>("desc") {
        t.description = Some(n.clone());
    }

    let t = update_transaction(conn, bus, profile, &t)?;
    println!(
        "Updated transaction {} ({} {} on {})",
        t.id,
        t.kind.as_str(),
        fmt_money(&t.amount, &t.currency),
        t.date
    );
    Ok(())
}

fn rm(conn: &mut Connection, bus: &ChangeBus, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let t = delete_transaction(conn, bus, profile, id)?;
    println!(
        "Removed transaction {} ({} {})",
        id,
        t.kind.as_str(),
        fmt_money(&t.amount, &t.currency)
    );
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let profile = active_profile(conn)?;
    let mut filter = TransactionFilter {
        unassigned: sub.get_flag("unassigned"),
        month: sub.get_one::<String>("month").cloned(),
        limit: sub.get_one::<u32>("limit").copied(),
        ..Default::default()
    };
    if let Some(name) = sub.get_one::<String>("wallet") {
        filter.wallet_id = Some(id_for_wallet(conn, profile, name)?);
    }
    if let Some(c) = sub.get_one::<String>("category") {
        filter.category_id = Some(id_for_category(conn, c)?);
    }
    if let Some(k) = sub.get_one::<String>("kind") {
        filter.kind = Some(TransactionKind::parse(k)?);
    }
    Ok(list_transactions(conn, profile, &filter)?)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let wallet_names = wallet_names(conn, profile)?;
        let category_names = category_names(conn)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.kind.as_str().to_string(),
                    fmt_money(&t.amount, &t.currency),
                    t.wallet_id
                        .and_then(|id| wallet_names.get(&id).cloned())
                        .unwrap_or_default(),
                    t.category_id
                        .and_then(|id| category_names.get(&id).cloned())
                        .unwrap_or_default(),
                    t.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Kind", "Amount", "Wallet", "Category", "Note"],
                rows
            )
        );
    }
    Ok(())
}

pub(crate) fn wallet_names(conn: &Connection, profile: i64) -> Result<HashMap<i64, String>> {
    let mut stmt = conn.prepare("SELECT id, name FROM wallets WHERE profile_id=?1")?;
    let rows = stmt.query_map(rusqlite::params![profile], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut out = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        out.insert(id, name);
    }
    Ok(out)
}

fn category_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        out.insert(id, name);
    }
    Ok(out)
}
