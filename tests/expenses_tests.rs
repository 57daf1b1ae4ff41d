// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;

use rusqlite::Connection;
use rust_decimal::Decimal;
use spendguard::commands::expenses;
use spendguard::models::{BudgetPolicy, CategoryBudget, NewExpense, Period};
use spendguard::{cli, db};
use tempfile::NamedTempFile;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let mut policy = BudgetPolicy::default();
    for (dept, cat, limit) in [("IT", "Software", 20_000), ("IT", "Hardware", 15_000)] {
        policy.insert(dept, cat, CategoryBudget {
            limit: Decimal::from(limit),
            period: Period::Monthly,
        });
    }
    db::save_policy(&mut conn, &policy).unwrap();
    conn
}

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

fn list_matches(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["spendguard", "expenses", "list"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    let Some(("expenses", sub)) = matches.subcommand() else {
        panic!("no expenses subcommand");
    };
    let Some(("list", list_sub)) = sub.subcommand() else {
        panic!("no list subcommand");
    };
    list_sub.clone()
}

#[test]
fn import_counts_matched_and_unmatched_rows() {
    let mut conn = setup();
    let file = csv_file(
        "date,amount,category,vendor,department,description\n\
         2025-06-01,15000,Software,Acme,IT,License renewal\n\
         2025-06-02,500,Audit,KPMG,Finance,Quarterly review\n\
         ,2000,Hardware,CompuParts,IT,\n",
    );

    let (recorded, unmatched) =
        expenses::import_csv(&mut conn, file.path().to_str().unwrap()).unwrap();
    assert_eq!(recorded, 2);
    assert_eq!(unmatched, 1);

    let stored = db::load_transactions(&conn).unwrap();
    assert_eq!(stored.len(), 3);
    // The unmatched row is kept for audit but carries no status snapshot
    let audit = stored.iter().find(|t| t.department == "Finance").unwrap();
    assert!(!audit.matched);
    assert!(audit.status.is_none());

    let ledger = db::load_ledger(&conn).unwrap();
    assert_eq!(
        ledger.usage_record("IT", "Software").unwrap().spent,
        Decimal::from(15_000)
    );
}

#[test]
fn bad_row_aborts_the_whole_batch() {
    let mut conn = setup();
    let file = csv_file(
        "date,amount,category,vendor,department,description\n\
         2025-06-01,15000,Software,Acme,IT,License renewal\n\
         2025-06-02,not-a-number,Hardware,CompuParts,IT,Laptops\n\
         2025-06-03,2000,Software,Acme,IT,Seats\n",
    );

    let err = expenses::import_csv(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    // The error identifies the offending row (header is row 1)
    assert!(format!("{:#}", err).contains("Row 3"), "got: {:#}", err);
    // Rows before the failure are rolled back with it
    assert_eq!(db::load_transactions(&conn).unwrap().len(), 0);
}

#[test]
fn validation_failure_mid_file_also_aborts() {
    let mut conn = setup();
    let file = csv_file(
        "date,amount,category,vendor,department,description\n\
         2025-06-01,1000,Software,Acme,IT,ok\n\
         2025-06-02,1000,Software,Acme,,missing department\n",
    );

    let err = expenses::import_csv(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("Row 3"), "got: {:#}", err);
    assert_eq!(db::load_transactions(&conn).unwrap().len(), 0);
}

#[test]
fn list_orders_by_timestamp_not_insertion() {
    let conn = setup();
    let mut ledger = db::load_ledger(&conn).unwrap();
    // Back-dated expense recorded last
    for (amount, date) in [
        (1_000, "2025-06-10T00:00:00Z"),
        (2_000, "2025-06-20T00:00:00Z"),
        (3_000, "2025-06-01T00:00:00Z"),
    ] {
        let tx = ledger
            .record(NewExpense {
                amount: Decimal::from(amount),
                department: "IT".to_string(),
                category: "Software".to_string(),
                timestamp: Some(date.parse().unwrap()),
                ..Default::default()
            })
            .unwrap();
        db::insert_transaction(&conn, &tx).unwrap();
    }

    let rows = expenses::query_rows(&conn, &list_matches(&[])).unwrap();
    let amounts: Vec<Decimal> = rows.iter().map(|t| t.amount).collect();
    assert_eq!(
        amounts,
        vec![Decimal::from(2_000), Decimal::from(1_000), Decimal::from(3_000)]
    );

    // --limit truncates after ordering, so the back-dated row drops off
    let rows = expenses::query_rows(&conn, &list_matches(&["--limit", "2"])).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|t| t.amount != Decimal::from(3_000)));
}

#[test]
fn list_filters_by_category_and_unmatched() {
    let conn = setup();
    let mut ledger = db::load_ledger(&conn).unwrap();
    for (dept, cat, amount) in [
        ("IT", "Software", 100),
        ("IT", "Hardware", 200),
        ("Legal", "Retainers", 300),
    ] {
        let tx = ledger
            .record(NewExpense {
                amount: Decimal::from(amount),
                department: dept.to_string(),
                category: cat.to_string(),
                ..Default::default()
            })
            .unwrap();
        db::insert_transaction(&conn, &tx).unwrap();
    }

    let rows = expenses::query_rows(&conn, &list_matches(&["--category", "Software"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, Decimal::from(100));

    let rows = expenses::query_rows(&conn, &list_matches(&["--unmatched"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].department, "Legal");
}
