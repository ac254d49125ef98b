// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::balance;
use crate::ledger::events::{Change, ChangeBus};
use crate::ledger::store;
use crate::utils::{active_profile, pretty_table};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

/// Cross-checks the active profile: cached balances against recomputed ones,
/// cross-currency transfers without a captured conversion, and schedules
/// that are overdue. `--fix` reconciles drifted wallets; the other findings
/// are informational.
pub fn handle(conn: &Connection, bus: &ChangeBus, m: &clap::ArgMatches) -> Result<()> {
    let fix = m.get_flag("fix");
    let profile = active_profile(conn)?;
    let mut rows = Vec::new();
    let mut fixed = 0usize;

    for wallet in store::list_wallets(conn, profile)? {
        let computed = balance::compute_balance(conn, profile, wallet.id)?;
        if computed != wallet.current_balance {
            if fix {
                balance::recalculate_balance(conn, profile, wallet.id)?;
                fixed += 1;
                rows.push(vec![
                    "balance_drift_fixed".into(),
                    format!(
                        "wallet '{}': cached {} corrected to {}",
                        wallet.name, wallet.current_balance, computed
                    ),
                ]);
            } else {
                rows.push(vec![
                    "balance_drift".into(),
                    format!(
                        "wallet '{}': cached {} but history sums to {}",
                        wallet.name, wallet.current_balance, computed
                    ),
                ]);
            }
        }
    }

    // Cross-currency transfers that never captured a rate. Left alone even
    // under --fix: the stored value is a historical record.
    let mut stmt = conn.prepare(
        "SELECT t.id, t.date, f.currency, w.currency
         FROM transfers t
         JOIN wallets f ON t.from_wallet_id=f.id
         JOIN wallets w ON t.to_wallet_id=w.id
         WHERE t.profile_id=?1 AND f.currency <> w.currency AND t.converted_amount IS NULL
         ORDER BY t.date",
    )?;
    let mut cur = stmt.query(rusqlite::params![profile])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let from_ccy: String = r.get(2)?;
        let to_ccy: String = r.get(3)?;
        rows.push(vec![
            "missing_conversion".into(),
            format!("transfer {} on {} ({} -> {})", id, date, from_ccy, to_ccy),
        ]);
    }

    let today = Utc::now().date_naive();
    for s in store::list_due_schedules(conn, profile, today)? {
        rows.push(vec![
            "overdue_schedule".into(),
            format!(
                "schedule {} was due {}; run `coinkeep scheduled run`",
                s.id, s.next_run_date
            ),
        ]);
    }

    if fixed > 0 {
        bus.publish(Change::Wallets);
    }
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
