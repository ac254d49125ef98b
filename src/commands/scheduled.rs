// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::wallet_names;
use crate::ledger::events::ChangeBus;
use crate::ledger::schedule::{
    NewSchedule, create_scheduled, delete_scheduled, list_schedules, run_due, toggle_scheduled,
};
use crate::models::Frequency;
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
        Some(("list", sub)) => list(conn, sub)?,
        Some(("toggle", sub)) => {
            let profile = active_profile(conn)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let s = toggle_scheduled(conn, bus, profile, id)?;
            println!(
                "Schedule {} is now {}",
                id,
                if s.is_active { "active" } else { "paused" }
            );
        }
        Some(("rm", sub)) => {
            let profile = active_profile(conn)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            delete_scheduled(conn, bus, profile, id)?;
            println!("Removed schedule {}", id);
        }
        Some(("run", sub)) => run(conn, bus, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, bus: &ChangeBus, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let frequency = Frequency::parse(sub.get_one::<String>("frequency").unwrap())?;
    let day_of_week = sub.get_one::<u32>("day-of-week").copied();
    let day_of_month = sub.get_one::<u32>("day-of-month").copied();
    let from_name = sub.get_one::<String>("from").unwrap();
    let to_name = sub.get_one::<String>("to").unwrap();
    let new = NewSchedule {
        from_wallet_id: id_for_wallet(conn, profile, from_name)?,
        to_wallet_id: id_for_wallet(conn, profile, to_name)?,
        amount: parse_positive_decimal(sub.get_one::<String>("amount").unwrap())?,
        frequency,
        day_of_week,
        day_of_month,
        total_occurrences: sub.get_one::<u32>("occurrences").copied(),
        description: sub.get_one::<String>("desc").cloned(),
    };
    let s = create_scheduled(conn, bus, profile, new, Utc::now().date_naive())?;
    println!(
        "Scheduled {} {} from '{}' to '{}'; first run on {}",
        frequency.as_str(),
        fmt_money(&s.amount, &s.currency),
        from_name,
        to_name,
        s.next_run_date
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let data = list_schedules(conn, profile, !sub.get_flag("all"))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let names = wallet_names(conn, profile)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|s| {
                vec![
                    s.id.to_string(),
                    names.get(&s.from_wallet_id).cloned().unwrap_or_default(),
                    names.get(&s.to_wallet_id).cloned().unwrap_or_default(),
                    fmt_money(&s.amount, &s.currency),
                    s.frequency.as_str().to_string(),
                    s.next_run_date.to_string(),
                    s.last_run_date.map(|d| d.to_string()).unwrap_or_default(),
                    if s.is_active { "yes".into() } else { "no".into() },
                    s.remaining_occurrences
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "∞".into()),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Id", "From", "To", "Amount", "Frequency", "Next run", "Last run", "Active",
                    "Remaining"
                ],
                rows
            )
        );
    }
    Ok(())
}

fn run(conn: &mut Connection, bus: &ChangeBus, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let today = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => Utc::now().date_naive(),
    };
    let created = run_due(conn, bus, profile, today)?;
    if created.is_empty() {
        println!("No scheduled transfers due on {}", today);
        return Ok(());
    }
    let names = wallet_names(conn, profile)?;
    for t in &created {
        println!(
            "Materialized transfer {}: {} from '{}' to '{}'",
            t.id,
            fmt_money(&t.amount, &t.currency),
            names.get(&t.from_wallet_id).cloned().unwrap_or_default(),
            names.get(&t.to_wallet_id).cloned().unwrap_or_default()
        );
    }
    println!("{} scheduled transfer(s) materialized", created.len());
    Ok(())
}
