// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;

use crate::models::{NewExpense, Transaction};
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, parse_timestamp, pretty_table};
use crate::db;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => record(conn, sub)?,
        Some(("import", sub)) => import(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn record(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let timestamp = sub
        .get_one::<String>("date")
        .map(|d| parse_timestamp(d))
        .transpose()?;

    let expense = NewExpense {
        amount,
        department: sub.get_one::<String>("department").unwrap().clone(),
        category: sub.get_one::<String>("category").unwrap().clone(),
        vendor: sub.get_one::<String>("vendor").cloned(),
        description: sub.get_one::<String>("description").cloned(),
        timestamp,
        correction: sub.get_flag("correction"),
    };

    let mut ledger = db::load_ledger(conn)?;
    let tx = ledger.record(expense)?;
    db::insert_transaction(conn, &tx)?;

    if maybe_print_json(json_flag, false, &tx)? {
        return Ok(());
    }
    if tx.matched {
        println!(
            "Recorded {} for {}/{} (id {}): {} at {}% of budget",
            tx.amount,
            tx.department,
            tx.category,
            tx.id,
            tx.status.map(|s| s.as_str()).unwrap_or("-"),
            tx.usage_percent.unwrap_or_default()
        );
    } else {
        println!(
            "Recorded {} for {}/{} (id {}): unmatched, excluded from usage totals",
            tx.amount, tx.department, tx.category, tx.id
        );
    }
    Ok(())
}

fn import(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let (recorded, unmatched) = import_csv(conn, path)?;
    println!(
        "Imported {} expenses from {} ({} matched, {} unmatched)",
        recorded + unmatched,
        path,
        recorded,
        unmatched
    );
    Ok(())
}

/// CSV columns: date, amount, category, vendor, department, description.
/// The whole file lands in one store transaction; a bad row aborts the batch.
/// Returns (matched, unmatched) counts.
pub fn import_csv(conn: &mut Connection, path: &str) -> Result<(usize, usize)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let mut ledger = db::load_ledger(conn)?;
    let store = conn.transaction()?;
    let mut recorded = 0usize;
    let mut unmatched = 0usize;

    for (i, result) in rdr.records().enumerate() {
        let row = i + 2; // 1-based, after the header
        let rec = result.with_context(|| format!("Bad CSV record at row {}", row))?;
        let date_raw = rec.get(0).map(str::trim).unwrap_or("");
        let amount_raw = rec
            .get(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .with_context(|| format!("Row {}: amount missing", row))?;
        let expense = NewExpense {
            amount: parse_decimal(amount_raw).with_context(|| format!("Row {}", row))?,
            category: rec.get(2).map(str::trim).unwrap_or("").to_string(),
            vendor: rec
                .get(3)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            department: rec.get(4).map(str::trim).unwrap_or("").to_string(),
            description: rec
                .get(5)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            timestamp: if date_raw.is_empty() {
                None
            } else {
                Some(parse_timestamp(date_raw).with_context(|| format!("Row {}", row))?)
            },
            correction: false,
        };

        let tx = ledger
            .record(expense)
            .with_context(|| format!("Row {}", row))?;
        db::insert_transaction(&store, &tx)?;
        if tx.matched {
            recorded += 1;
        } else {
            unmatched += 1;
        }
    }
    store.commit()?;
    Ok((recorded, unmatched))
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;

    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|t| {
            vec![
                t.timestamp.format("%Y-%m-%d").to_string(),
                t.department.clone(),
                t.category.clone(),
                fmt_money(&t.amount),
                t.vendor.clone(),
                t.status.map(|s| s.as_str().to_string()).unwrap_or_else(|| {
                    "unmatched".to_string()
                }),
                t.usage_percent
                    .map(|p| format!("{}%", p))
                    .unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "Department", "Category", "Amount", "Vendor", "Status", "Usage"],
            rows,
        )
    );
    Ok(())
}

/// Filtered transaction rows, most recent timestamp first, truncated to
/// --limit. Back-dated transactions sort by their own timestamp, not by
/// insertion order.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let mut data: Vec<Transaction> = db::load_transactions(conn)?;
    if let Some(dept) = sub.get_one::<String>("department") {
        data.retain(|t| &t.department == dept);
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        data.retain(|t| &t.category == cat);
    }
    if sub.get_flag("unmatched") {
        data.retain(|t| !t.matched);
    }
    data.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}
