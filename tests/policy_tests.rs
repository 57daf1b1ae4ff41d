// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;

use rust_decimal::Decimal;
use spendguard::error::PipelineError;
use spendguard::models::Period;
use spendguard::policy;
use tempfile::NamedTempFile;

#[test]
fn json_policy_happy_path() {
    let doc = r#"{
        "departments": {
            "IT": {
                "categories": {
                    "Software": {"limit": 20000, "period": "monthly"},
                    "Hardware": {"limit": 15000, "period": "annual"}
                }
            },
            "HR": {"categories": {"Training": {"limit": 6000}}}
        }
    }"#;
    let p = policy::from_json_str(doc).unwrap();

    assert_eq!(p.category_count(), 3);
    let software = p.category("IT", "Software").unwrap();
    assert_eq!(software.limit, Decimal::from(20_000));
    assert_eq!(software.period, Period::Monthly);
    assert_eq!(p.category("IT", "Hardware").unwrap().period, Period::Annual);
    // Period defaults to monthly when omitted
    assert_eq!(p.category("HR", "Training").unwrap().period, Period::Monthly);
}

#[test]
fn invalid_json_is_a_policy_error() {
    let err = policy::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, PipelineError::Policy(_)));
    let err = policy::from_json_str(r#"{"departments": {}}"#).unwrap_err();
    assert!(matches!(err, PipelineError::Policy(_)));
}

#[test]
fn negative_limit_rejected_at_load() {
    let doc = r#"{"departments": {"IT": {"categories": {"Software": {"limit": -5}}}}}"#;
    // Parsing succeeds; the ledger's validation rejects it
    let p = policy::from_json_str(doc).unwrap();
    let mut ledger = spendguard::ledger::ExpenseLedger::new();
    let err = ledger.load_policy(p).unwrap_err();
    assert!(matches!(err, PipelineError::Policy(_)));
}

#[test]
fn csv_policy() {
    let doc = "department,category,limit,period\n\
               IT,Software,20000,monthly\n\
               IT,Hardware,\"15000\",annual\n\
               Marketing,Advertising,25000,\n";
    let p = policy::from_csv_str(doc).unwrap();

    assert_eq!(p.category_count(), 3);
    assert_eq!(p.category("IT", "Hardware").unwrap().period, Period::Annual);
    assert_eq!(
        p.category("Marketing", "Advertising").unwrap().period,
        Period::Monthly
    );

    let err = policy::from_csv_str("department,category,limit\nIT,,100\n").unwrap_err();
    assert!(matches!(err, PipelineError::Extraction(_)));
    let err =
        policy::from_csv_str("department,category,limit,period\nIT,Software,100,weekly\n")
            .unwrap_err();
    assert!(matches!(err, PipelineError::Extraction(_)));
}

#[test]
fn text_extraction() {
    let doc = "\
        IT department budget: $50,000\n\
        - Software: $20,000 per month\n\
        - Hardware - $15,000\n\
        \n\
        Marketing department budget: $35,000\n\
        Advertising: $25,000\n";
    let p = policy::from_text(doc).unwrap();

    assert_eq!(p.category("IT", "Software").unwrap().limit, Decimal::from(20_000));
    assert_eq!(p.category("IT", "Hardware").unwrap().limit, Decimal::from(15_000));
    assert_eq!(
        p.category("Marketing", "Advertising").unwrap().limit,
        Decimal::from(25_000)
    );
}

#[test]
fn unusable_text_is_an_extraction_error() {
    let err = policy::from_text("nothing resembling a budget here").unwrap_err();
    assert!(matches!(err, PipelineError::Extraction(_)));
}

#[test]
fn load_document_dispatches_on_extension() {
    let mut json = NamedTempFile::with_suffix(".json").unwrap();
    write!(
        json,
        r#"{{"departments": {{"IT": {{"categories": {{"Software": {{"limit": 100}}}}}}}}}}"#
    )
    .unwrap();
    json.flush().unwrap();
    let p = policy::load_document(json.path()).unwrap();
    assert_eq!(p.category_count(), 1);

    let mut bin = NamedTempFile::with_suffix(".xlsx").unwrap();
    bin.write_all(b"PK\x03\x04").unwrap();
    bin.flush().unwrap();
    let err = policy::load_document(bin.path()).unwrap_err();
    assert!(matches!(err, PipelineError::Extraction(_)));
}
