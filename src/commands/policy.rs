// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::ledger::ExpenseLedger;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use crate::{db, policy};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("load", sub)) => load(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("reset", _)) => reset(conn)?,
        _ => {}
    }
    Ok(())
}

fn load(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let parsed = policy::load_document(Path::new(path))?;

    // Running it through the ledger applies the negative-limit check and
    // mirrors the in-memory reset the store performs below.
    let mut ledger = ExpenseLedger::new();
    ledger.load_policy(parsed)?;
    let loaded = ledger.policy().cloned().unwrap_or_default();

    db::save_policy(conn, &loaded)?;
    println!(
        "Loaded {} categories across {} departments from {} (usage state reset)",
        loaded.category_count(),
        loaded.departments.len(),
        path
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let Some(policy) = db::load_policy(conn)? else {
        println!("No policy loaded. Run `spendguard policy load <path>` first.");
        return Ok(());
    };
    if maybe_print_json(json_flag, false, &policy)? {
        return Ok(());
    }
    let rows = policy
        .iter_categories()
        .map(|(dept, cat, b)| {
            vec![
                dept.to_string(),
                cat.to_string(),
                fmt_money(&b.limit),
                b.period.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Department", "Category", "Limit", "Period"], rows)
    );
    Ok(())
}

fn reset(conn: &mut Connection) -> Result<()> {
    db::reset_policy(conn)?;
    println!("Policy and transaction history cleared (breach log kept)");
    Ok(())
}
