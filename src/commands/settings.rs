// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Result};
use rusqlite::Connection;

use crate::utils::{pretty_table, set_setting};

const KNOWN_KEYS: &[&str] = &["generator_url", "webhook_url"];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("show", _)) => show(conn)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let key = sub.get_one::<String>("key").unwrap();
    let value = sub.get_one::<String>("value").unwrap();
    if !KNOWN_KEYS.contains(&key.as_str()) {
        return Err(anyhow!(
            "Unknown setting '{}' (expected one of: {})",
            key,
            KNOWN_KEYS.join(", ")
        ));
    }
    set_setting(conn, key, value)?;
    println!("Set {} = {}", key, value);
    Ok(())
}

fn show(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |r| {
        Ok(vec![r.get::<_, String>(0)?, r.get::<_, String>(1)?])
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if data.is_empty() {
        println!("No settings stored");
    } else {
        println!("{}", pretty_table(&["Key", "Value"], data));
    }
    Ok(())
}
