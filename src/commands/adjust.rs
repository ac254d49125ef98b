// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::LedgerError;
use crate::ledger::adjust::apply_cash_adjustment;
use crate::ledger::events::ChangeBus;
use crate::utils::{active_profile, fmt_money, id_for_wallet, parse_date, parse_decimal};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, bus: &ChangeBus, m: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let name = m.get_one::<String>("wallet").unwrap();
    let wallet_id = id_for_wallet(conn, profile, name)?;
    let counted = parse_decimal(m.get_one::<String>("counted").unwrap())?;
    let reason = m.get_one::<String>("reason").cloned();
    let date = match m.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => Utc::now().date_naive(),
    };

    match apply_cash_adjustment(conn, bus, profile, wallet_id, counted, reason, date) {
        Ok(adj) => {
            let ccy = &adj.transaction.currency;
            println!(
                "Recorded {} adjustment of {} for '{}' (transaction {})",
                adj.transaction.kind.as_str(),
                fmt_money(&adj.transaction.amount, ccy),
                name,
                adj.transaction.id
            );
            println!(
                "Balance: {} -> {}",
                fmt_money(&adj.previous_balance, ccy),
                fmt_money(&adj.new_balance, ccy)
            );
        }
        // A matching count is a fine outcome, not a failure.
        Err(LedgerError::NoDifference) => {
            println!("Nothing to adjust: '{}' already matches the counted balance", name);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
