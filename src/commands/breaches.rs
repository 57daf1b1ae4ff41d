// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::detector::BreachDetector;
use crate::models::{Breach, SeverityScore};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use crate::db;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("detect", sub)) => detect(conn, sub)?,
        Some(("history", sub)) => history(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct DetectedBreach {
    #[serde(flatten)]
    breach: Breach,
    score: SeverityScore,
}

fn detect(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let ledger = db::load_ledger(conn)?;
    let mut detector = BreachDetector::with_history(db::load_breach_history(conn)?);

    let found = detector.analyze(&ledger)?;
    db::insert_breaches(conn, Uuid::new_v4(), &found)?;

    let detected: Vec<DetectedBreach> = found
        .into_iter()
        .map(|breach| {
            let score = detector.score_severity(&breach);
            DetectedBreach { breach, score }
        })
        .collect();

    if maybe_print_json(json_flag, false, &detected)? {
        return Ok(());
    }
    if detected.is_empty() {
        println!("No budget breaches detected");
        return Ok(());
    }
    let rows = detected
        .iter()
        .map(|d| {
            vec![
                d.breach.department.clone(),
                d.breach.category.clone(),
                fmt_money(&d.breach.overage),
                format!("{}%", d.breach.overage_percent),
                d.breach.severity.to_string(),
                d.score.final_score.to_string(),
                d.score.tier.to_string(),
                d.breach.recurrence_count.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Department", "Category", "Overage", "Over %", "Label", "Score", "Tier", "Recurrence"],
            rows,
        )
    );
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let log = db::load_breach_history(conn)?;

    if maybe_print_json(json_flag, false, &log)? {
        return Ok(());
    }
    if log.is_empty() {
        println!("Breach log is empty");
        return Ok(());
    }
    let rows = log
        .iter()
        .map(|b| {
            vec![
                b.detected_at.format("%Y-%m-%d %H:%M").to_string(),
                b.department.clone(),
                b.category.clone(),
                fmt_money(&b.overage),
                b.severity.to_string(),
                b.recurrence_count.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Detected", "Department", "Category", "Overage", "Severity", "Recurrence"],
            rows,
        )
    );
    Ok(())
}
