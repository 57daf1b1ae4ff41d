// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{StatusReport, UsageSnapshot};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use crate::db;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("snapshot", sub)) => snapshot(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn snapshot(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let snap: UsageSnapshot = db::load_ledger(conn)?.usage_snapshot();

    if maybe_print_json(json_flag, jsonl_flag, &snap)? {
        return Ok(());
    }
    let rows = snap
        .categories
        .iter()
        .map(|c| {
            vec![
                c.department.clone(),
                c.category.clone(),
                fmt_money(&c.spent),
                fmt_money(&c.limit),
                format!("{}%", c.usage_percent),
                fmt_money(&c.remaining),
                c.transaction_count.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Department", "Category", "Spent", "Limit", "Usage", "Remaining", "Txns"],
            rows,
        )
    );
    let rollups = snap
        .departments
        .iter()
        .map(|d| {
            vec![
                d.department.clone(),
                fmt_money(&d.spent),
                fmt_money(&d.limit),
                format!("{}%", d.usage_percent),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Department", "Spent", "Limit", "Usage"], rollups)
    );
    Ok(())
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let report: StatusReport = db::load_ledger(conn)?.real_time_status();

    if maybe_print_json(json_flag, false, &report)? {
        return Ok(());
    }
    let rows = report
        .rows
        .iter()
        .map(|r| {
            vec![
                r.department.clone(),
                r.category.clone(),
                fmt_money(&r.spent),
                fmt_money(&r.limit),
                format!("{}%", r.usage_percent),
                r.status.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Department", "Category", "Spent", "Limit", "Usage", "Status"],
            rows,
        )
    );
    println!(
        "Overall: {} ({} categories, {} exceeded, {} approaching)",
        report.overall,
        report.summary.categories,
        report.summary.exceeded,
        report.summary.approaching
    );
    for alert in &report.alerts {
        println!("  ! {}", alert);
    }
    Ok(())
}
