// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::events::ChangeBus;
use crate::ledger::wallets;
use crate::utils::{
    active_profile, fmt_money, id_for_wallet, maybe_print_json, parse_decimal, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, bus: &ChangeBus, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let profile = active_profile(conn)?;
            let name = sub.get_one::<String>("name").unwrap();
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            let initial = match sub.get_one::<String>("initial") {
                Some(s) => parse_decimal(s)?,
                None => Decimal::ZERO,
            };
            let w = wallets::create_wallet(conn, bus, profile, name, &ccy, initial)?;
            println!(
                "Added wallet '{}' ({}) starting at {}",
                w.name,
                w.currency,
                fmt_money(&w.initial_balance, &w.currency)
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let profile = active_profile(conn)?;
            let name = sub.get_one::<String>("name").unwrap();
            let id = id_for_wallet(conn, profile, name)?;
            wallets::delete_wallet(conn, bus, profile, id).with_context(|| {
                format!(
                    "Could not remove wallet '{}'; wallets with recorded history cannot be deleted",
                    name
                )
            })?;
            println!("Removed wallet '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let data = wallets::list_wallets(conn, profile)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|w| {
                vec![
                    w.id.to_string(),
                    w.name.clone(),
                    w.currency.clone(),
                    fmt_money(&w.initial_balance, &w.currency),
                    fmt_money(&w.current_balance, &w.currency),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Currency", "Initial", "Balance"], rows)
        );
    }
    Ok(())
}
