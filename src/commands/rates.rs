// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::rates;
use crate::utils::{
    get_base_currency, parse_date, parse_positive_decimal, pretty_table, set_base_currency,
};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-base", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            set_base_currency(conn, &ccy)?;
            println!("Base currency set to {}", ccy);
        }
        Some(("set", sub)) => set_rate(conn, sub)?,
        Some(("list", _)) => list_rates(conn)?,
        Some(("convert", sub)) => convert_amount(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set_rate(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let base = sub.get_one::<String>("base").unwrap().to_uppercase();
    let quote = sub.get_one::<String>("quote").unwrap().to_uppercase();
    let rate = parse_positive_decimal(sub.get_one::<String>("rate").unwrap())?;
    if base == quote {
        bail!("Base and quote currency must differ");
    }
    conn.execute(
        "INSERT INTO fx_rates(date, base, quote, rate) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(date, base, quote) DO UPDATE SET rate=excluded.rate",
        params![date.to_string(), base, quote, rate.to_string()],
    )?;
    println!("Stored rate {}: 1 {} = {} {}", date, base, rate, quote);
    Ok(())
}

fn list_rates(conn: &Connection) -> Result<()> {
    println!("Base currency: {}", get_base_currency(conn)?);
    let mut stmt = conn.prepare(
        "SELECT date, base, quote, rate FROM fx_rates ORDER BY date DESC, base, quote LIMIT 50",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (d, b, q, r) = row?;
        data.push(vec![d, b, q, r]);
    }
    println!("{}", pretty_table(&["Date", "Base", "Quote", "Rate"], data));
    Ok(())
}

fn convert_amount(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_positive_decimal(sub.get_one::<String>("amount").unwrap())?;
    let from = sub.get_one::<String>("from").unwrap().to_uppercase();
    let to = sub.get_one::<String>("to").unwrap().to_uppercase();
    match rates::rate(conn, date, &from, &to)? {
        Some(rate) => {
            println!(
                "{} {} -> {} {} (rate {})",
                amount,
                from,
                (amount * rate).round_dp(4),
                to,
                rate
            );
        }
        None => bail!("No rate available for {} -> {} on or before {}", from, to, date),
    }
    Ok(())
}
