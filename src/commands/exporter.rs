// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::active_profile;
use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        Some(("transfers", sub)) => export_transfers(conn, sub),
        _ => Ok(()),
    }
}

fn checked_format(sub: &clap::ArgMatches) -> Result<String> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    // Validate before touching the output path so a bad format leaves no file.
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    Ok(fmt)
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = checked_format(sub)?;
    let out = sub.get_one::<String>("out").unwrap();
    let profile = active_profile(conn)?;

    let mut stmt = conn.prepare(
        "SELECT t.date, w.name, t.kind, t.amount, t.currency, c.name, t.description
         FROM transactions t
         LEFT JOIN wallets w ON t.wallet_id=w.id
         LEFT JOIN categories c ON t.category_id=c.id
         WHERE t.profile_id=?1
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt.query_map(params![profile], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, Option<String>>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<String>>(5)?,
            r.get::<_, Option<String>>(6)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "wallet", "kind", "amount", "currency", "category", "description",
            ])?;
            for row in rows {
                let (d, w, k, amt, ccy, cat, desc) = row?;
                wtr.write_record([
                    d,
                    w.unwrap_or_default(),
                    k,
                    amt,
                    ccy,
                    cat.unwrap_or_default(),
                    desc.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let mut items = Vec::new();
            for row in rows {
                let (d, w, k, amt, ccy, cat, desc) = row?;
                items.push(json!({
                    "date": d, "wallet": w, "kind": k, "amount": amt,
                    "currency": ccy, "category": cat, "description": desc
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}

fn export_transfers(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = checked_format(sub)?;
    let out = sub.get_one::<String>("out").unwrap();
    let profile = active_profile(conn)?;

    let mut stmt = conn.prepare(
        "SELECT t.date, f.name, w.name, t.amount, t.currency, t.converted_amount, t.description
         FROM transfers t
         LEFT JOIN wallets f ON t.from_wallet_id=f.id
         LEFT JOIN wallets w ON t.to_wallet_id=w.id
         WHERE t.profile_id=?1
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt.query_map(params![profile], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, Option<String>>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<String>>(5)?,
            r.get::<_, Option<String>>(6)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "from_wallet",
                "to_wallet",
                "amount",
                "currency",
                "converted_amount",
                "description",
            ])?;
            for row in rows {
                let (d, f, t, amt, ccy, conv, desc) = row?;
                wtr.write_record([
                    d,
                    f.unwrap_or_default(),
                    t.unwrap_or_default(),
                    amt,
                    ccy,
                    conv.unwrap_or_default(),
                    desc.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let mut items = Vec::new();
            for row in rows {
                let (d, f, t, amt, ccy, conv, desc) = row?;
                items.push(json!({
                    "date": d, "from_wallet": f, "to_wallet": t, "amount": amt,
                    "currency": ccy, "converted_amount": conv, "description": desc
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported transfers to {}", out);
    Ok(())
}
