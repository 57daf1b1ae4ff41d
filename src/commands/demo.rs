// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Seeds the store with a sample policy and a deterministic expense set
//! that leaves IT/Software and Marketing/Advertising exceeded and
//! Operations/Equipment approaching its limit.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::models::{BudgetPolicy, CategoryBudget, NewExpense, Period};
use crate::db;

const SAMPLE_CATEGORIES: &[(&str, &str, i64)] = &[
    ("IT", "Software", 20_000),
    ("IT", "Hardware", 15_000),
    ("IT", "Cloud_Services", 25_000),
    ("Marketing", "Advertising", 25_000),
    ("Marketing", "Events", 10_000),
    ("Operations", "Equipment", 12_000),
    ("Operations", "Supplies", 5_000),
    ("HR", "Recruitment", 8_000),
    ("HR", "Training", 6_000),
];

const SAMPLE_EXPENSES: &[(&str, &str, i64, &str, &str)] = &[
    ("IT", "Software", 15_000, "Acme Licensing", "Annual license renewal"),
    ("IT", "Software", 6_200, "Acme Licensing", "Seat expansion"),
    ("IT", "Hardware", 4_800, "CompuParts", "Laptop refresh"),
    ("IT", "Cloud_Services", 11_300, "Nimbus Cloud", "Compute and storage"),
    ("Marketing", "Advertising", 14_000, "AdSphere", "Q3 campaign"),
    ("Marketing", "Advertising", 12_750, "AdSphere", "Campaign extension"),
    ("Marketing", "Events", 3_600, "VenueWorks", "Product launch venue"),
    ("Operations", "Equipment", 10_500, "FactoryDirect", "Packaging line parts"),
    ("Operations", "Supplies", 1_200, "OfficeBox", "Warehouse supplies"),
    ("HR", "Recruitment", 2_900, "TalentNet", "Agency placement fee"),
];

pub fn handle(conn: &mut Connection) -> Result<()> {
    let mut policy = BudgetPolicy::default();
    for (dept, cat, limit) in SAMPLE_CATEGORIES {
        policy.insert(dept, cat, CategoryBudget {
            limit: Decimal::from(*limit),
            period: Period::Monthly,
        });
    }

    let mut ledger = crate::ledger::ExpenseLedger::new();
    ledger.load_policy(policy.clone())?;
    db::save_policy(conn, &policy)?;

    let store = conn.transaction()?;
    for (dept, cat, amount, vendor, description) in SAMPLE_EXPENSES {
        let tx = ledger.record(NewExpense {
            amount: Decimal::from(*amount),
            department: dept.to_string(),
            category: cat.to_string(),
            vendor: Some(vendor.to_string()),
            description: Some(description.to_string()),
            timestamp: None,
            correction: false,
        })?;
        db::insert_transaction(&store, &tx)?;
    }
    store.commit()?;

    let report = ledger.real_time_status();
    println!(
        "Demo data seeded: {} categories, {} expenses ({} exceeded, {} approaching)",
        report.summary.categories,
        SAMPLE_EXPENSES.len(),
        report.summary.exceeded,
        report.summary.approaching
    );
    println!("Try `spendguard usage status`, then `spendguard breaches detect`");
    Ok(())
}
