// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::utils::pretty_table;

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Transactions flagged matched whose category left the policy
    let mut stmt = conn.prepare(
        "SELECT t.department, t.category, COUNT(*) FROM transactions t
         WHERE t.matched = 1 AND NOT EXISTS (
             SELECT 1 FROM policy_categories p
             WHERE p.department = t.department AND p.category = t.category)
         GROUP BY t.department, t.category",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let dept: String = r.get(0)?;
        let cat: String = r.get(1)?;
        let n: i64 = r.get(2)?;
        rows.push(vec![
            "matched_txn_without_policy".into(),
            format!("{}/{} ({} transactions)", dept, cat, n),
        ]);
    }

    // 2) Breach log entries whose linked transactions are gone (expected
    //    after a policy reload, but worth surfacing)
    let mut stmt2 = conn.prepare("SELECT id, linked_transactions FROM breaches")?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: String = r.get(0)?;
        let linked: String = r.get(1)?;
        let ids: Vec<String> = serde_json::from_str(&linked).unwrap_or_default();
        for tx_id in ids {
            let found: i64 = conn.query_row(
                "SELECT COUNT(*) FROM transactions WHERE id = ?1",
                [&tx_id],
                |r| r.get(0),
            )?;
            if found == 0 {
                rows.push(vec![
                    "breach_links_missing_txn".into(),
                    format!("breach {} -> transaction {}", id, tx_id),
                ]);
            }
        }
    }

    // 3) Unparseable stored amounts
    let mut stmt3 = conn.prepare("SELECT id, amount FROM transactions")?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let id: String = r.get(0)?;
        let amount: String = r.get(1)?;
        if amount.parse::<rust_decimal::Decimal>().is_err() {
            rows.push(vec![
                "invalid_amount".into(),
                format!("transaction {}: '{}'", id, amount),
            ]);
        }
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
