// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::wallet_names;
use crate::ledger::events::ChangeBus;
use crate::ledger::transfers::{
    NewTransfer, TransferFilter, create_transfer, delete_transfer, get_transfer, list_transfers,
    update_transfer,
};
use crate::utils::{
    active_profile, fmt_money, id_for_wallet, maybe_print_json, parse_date,
    parse_positive_decimal, pretty_table,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, bus: &ChangeBus, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, bus, sub)?,
        Some(("edit", sub)) => edit(conn, bus, sub)?,
        Some(("rm", sub)) => {
            let profile = active_profile(conn)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let t = delete_transfer(conn, bus, profile, id)?;
            println!(
                "Removed transfer {} ({} on {})",
                id,
                fmt_money(&t.amount, &t.currency),
                t.date
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, bus: &ChangeBus, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let from_name = sub.get_one::<String>("from").unwrap();
    let to_name = sub.get_one::<String>("to").unwrap();
    let new = NewTransfer {
        from_wallet_id: id_for_wallet(conn, profile, from_name)?,
        to_wallet_id: id_for_wallet(conn, profile, to_name)?,
        amount: parse_positive_decimal(sub.get_one::<String>("amount").unwrap())?,
        date: match sub.get_one::<String>("date") {
            Some(s) => parse_date(s)?,
            None => Utc::now().date_naive(),
        },
        description: sub.get_one::<String>("desc").cloned(),
    };
    let t = create_transfer(conn, bus, profile, new)?;
    println!(
        "Transferred {} from '{}' to '{}' on {} (id {})",
        fmt_money(&t.amount, &t.currency),
        from_name,
        to_name,
        t.date,
        t.id
    );
    if let Some(conv) = t.converted_amount {
        println!("Destination credited {}", conv.round_dp(2));
    }
    Ok(())
}

fn edit(conn: &mut Connection, bus: &ChangeBus, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut t = get_transfer(conn, profile, id)?;

    if let Some(name) = sub.get_one::<String>("from") {
        t.from_wallet_id = id_for_wallet(conn, profile, name)?;
    }
    if let Some(name) = sub.get_one::<String>("to") {
        t.to_wallet_id = id_for_wallet(conn, profile, name)?;
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        t.amount = parse_positive_decimal(a)?;
    }
    if let Some(c) = sub.get_one::<String>("converted") {
        t.converted_amount = Some(parse_positive_decimal(c)?);
    }
    if let Some(d) = sub.get_one::<String>("date") {
        t.date = parse_date(d)?;
    }
    if let Some(n) = sub.get_one::<String>("desc") {
        t.description = Some(n.clone());
    }

    let t = update_transfer(conn, bus, profile, &t)?;
    println!(
        "Updated transfer {} ({} on {})",
        t.id,
        fmt_money(&t.amount, &t.currency),
        t.date
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let mut filter = TransferFilter {
        month: sub.get_one::<String>("month").cloned(),
        limit: sub.get_one::<u32>("limit").copied(),
        ..Default::default()
    };
    if let Some(name) = sub.get_one::<String>("wallet") {
        filter.wallet_id = Some(id_for_wallet(conn, profile, name)?);
    }
    let data = list_transfers(conn, profile, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let names = wallet_names(conn, profile)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    names.get(&t.from_wallet_id).cloned().unwrap_or_default(),
                    names.get(&t.to_wallet_id).cloned().unwrap_or_default(),
                    fmt_money(&t.amount, &t.currency),
                    t.converted_amount
                        .map(|c| c.round_dp(2).to_string())
                        .unwrap_or_default(),
                    t.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "From", "To", "Amount", "Credited", "Note"],
                rows
            )
        );
    }
    Ok(())
}
