// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{active_profile, id_for_profile, maybe_print_json, pretty_table, set_active_profile};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("INSERT INTO profiles(name) VALUES (?1)", params![name])?;
            println!("Added profile '{}'", name);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("use", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            // Only existing profiles can become active.
            id_for_profile(conn, name)?;
            set_active_profile(conn, name)?;
            println!("Active profile is now '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ProfileRow {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let active = active_profile(conn)?;
    let mut stmt = conn.prepare("SELECT id, name FROM profiles ORDER BY id")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
    let mut data = Vec::new();
    for row in rows {
        let (id, name) = row?;
        data.push(ProfileRow {
            id,
            name,
            active: id == active,
        });
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let table_rows: Vec<Vec<String>> = data
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.name.clone(),
                    if p.active { "*".into() } else { String::new() },
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Id", "Name", "Active"], table_rows));
    }
    Ok(())
}
