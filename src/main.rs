// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use coinkeep::ledger::events::ChangeBus;
use coinkeep::{cli, commands, db};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;
    let bus = ChangeBus::new();

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("profile", sub)) => commands::profiles::handle(&conn, sub)?,
        Some(("wallet", sub)) => commands::wallets::handle(&conn, &bus, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, &bus, sub)?,
        Some(("transfer", sub)) => commands::transfers::handle(&mut conn, &bus, sub)?,
        Some(("scheduled", sub)) => commands::scheduled::handle(&mut conn, &bus, sub)?,
        Some(("adjust", sub)) => commands::adjust::handle(&mut conn, &bus, sub)?,
        Some(("rates", sub)) => commands::rates::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, &bus, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
