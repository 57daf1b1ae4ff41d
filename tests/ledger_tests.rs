// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use spendguard::error::PipelineError;
use spendguard::ledger::ExpenseLedger;
use spendguard::models::{BudgetPolicy, CategoryBudget, NewExpense, Period, Status};

fn policy(entries: &[(&str, &str, i64)]) -> BudgetPolicy {
    let mut p = BudgetPolicy::default();
    for (dept, cat, limit) in entries {
        p.insert(dept, cat, CategoryBudget {
            limit: Decimal::from(*limit),
            period: Period::Monthly,
        });
    }
    p
}

fn expense(dept: &str, cat: &str, amount: i64) -> NewExpense {
    NewExpense {
        amount: Decimal::from(amount),
        department: dept.to_string(),
        category: cat.to_string(),
        ..Default::default()
    }
}

fn setup() -> ExpenseLedger {
    let mut ledger = ExpenseLedger::new();
    ledger
        .load_policy(policy(&[("IT", "Software", 20_000), ("IT", "Hardware", 10_000)]))
        .unwrap();
    ledger
}

#[test]
fn spent_is_sum_of_matched_amounts() {
    let mut ledger = setup();
    for amount in [4_000, 2_500, 1_500] {
        ledger.record(expense("IT", "Software", amount)).unwrap();
    }
    ledger.record(expense("IT", "Hardware", 9_000)).unwrap();

    let rec = ledger.usage_record("IT", "Software").unwrap();
    assert_eq!(rec.spent, Decimal::from(8_000));
    assert_eq!(rec.transactions.len(), 3);
    let rec = ledger.usage_record("IT", "Hardware").unwrap();
    assert_eq!(rec.spent, Decimal::from(9_000));
}

#[test]
fn usage_percent_is_monotonic_under_positive_spend() {
    let mut ledger = setup();
    let mut last = Decimal::ZERO;
    for amount in [1_000, 3_000, 500, 12_000, 7_000] {
        let tx = ledger.record(expense("IT", "Software", amount)).unwrap();
        let pct = tx.usage_percent.unwrap();
        assert!(pct >= last, "usage went backwards: {} < {}", pct, last);
        last = pct;
    }
}

#[test]
fn status_transitions_only_move_forward() {
    let mut ledger = setup();
    let mut seen = Vec::new();
    for amount in [5_000, 10_000, 2_000, 4_000] {
        let tx = ledger.record(expense("IT", "Software", amount)).unwrap();
        seen.push(tx.status.unwrap());
    }
    assert_eq!(
        seen,
        vec![
            Status::Safe,        // 25%
            Status::Safe,        // 75%
            Status::Approaching, // 85%
            Status::Exceeded,    // 105%
        ]
    );
    for pair in seen.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
}

#[test]
fn snapshot_is_idempotent() {
    let mut ledger = setup();
    ledger.record(expense("IT", "Software", 7_500)).unwrap();

    let a = ledger.usage_snapshot();
    let b = ledger.usage_snapshot();
    assert_eq!(
        serde_json::to_value(&a).unwrap(),
        serde_json::to_value(&b).unwrap()
    );
}

#[test]
fn zero_limit_category_is_always_safe() {
    let mut ledger = ExpenseLedger::new();
    ledger
        .load_policy(policy(&[("Ops", "Misc", 0)]))
        .unwrap();
    let tx = ledger.record(expense("Ops", "Misc", 5_000)).unwrap();

    assert_eq!(tx.usage_percent.unwrap(), Decimal::ZERO);
    assert_eq!(tx.status.unwrap(), Status::Safe);
    let snap = ledger.usage_snapshot();
    assert_eq!(snap.categories[0].usage_percent, Decimal::ZERO);
}

#[test]
fn unmatched_transaction_is_stored_but_not_counted() {
    let mut ledger = setup();
    let tx = ledger.record(expense("Legal", "Retainers", 2_000)).unwrap();

    assert!(!tx.matched);
    assert!(tx.status.is_none());
    assert_eq!(ledger.transactions().len(), 1);
    // No usage record was created for the unknown pair
    assert!(ledger.usage_record("Legal", "Retainers").is_none());
    let snap = ledger.usage_snapshot();
    assert!(snap.categories.iter().all(|c| c.spent == Decimal::ZERO));
}

#[test]
fn validation_rejects_missing_fields_and_bad_signs() {
    let mut ledger = setup();

    let err = ledger.record(expense("", "Software", 100)).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
    let err = ledger.record(expense("IT", "  ", 100)).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
    let err = ledger.record(expense("IT", "Software", 0)).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
    let err = ledger.record(expense("IT", "Software", -500)).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));

    // Rejected rows leave the ledger untouched
    assert!(ledger.is_empty());

    // Negative amounts pass with the correction flag
    ledger.record(expense("IT", "Software", 1_000)).unwrap();
    let tx = ledger
        .record(NewExpense {
            correction: true,
            ..expense("IT", "Software", -200)
        })
        .unwrap();
    assert!(tx.matched);
    assert_eq!(
        ledger.usage_record("IT", "Software").unwrap().spent,
        Decimal::from(800)
    );
}

#[test]
fn negative_limit_policy_is_rejected_and_previous_kept() {
    let mut ledger = setup();
    ledger.record(expense("IT", "Software", 3_000)).unwrap();

    let mut bad = BudgetPolicy::default();
    bad.insert("IT", "Software", CategoryBudget {
        limit: Decimal::from(-1),
        period: Period::Monthly,
    });
    let err = ledger.load_policy(bad).unwrap_err();
    assert!(matches!(err, PipelineError::Policy(_)));

    // Previously loaded policy and recorded usage survive the failed load
    assert_eq!(
        ledger.usage_record("IT", "Software").unwrap().spent,
        Decimal::from(3_000)
    );
}

#[test]
fn policy_reload_resets_usage_state() {
    let mut ledger = setup();
    ledger.record(expense("IT", "Software", 18_000)).unwrap();

    ledger
        .load_policy(policy(&[("IT", "Software", 20_000)]))
        .unwrap();
    assert!(ledger.is_empty());
    assert_eq!(
        ledger.usage_record("IT", "Software").unwrap().spent,
        Decimal::ZERO
    );
}

#[test]
fn status_report_flags_and_alerts() {
    let mut ledger = setup();
    ledger.record(expense("IT", "Software", 21_000)).unwrap();
    ledger.record(expense("IT", "Hardware", 8_500)).unwrap();

    let report = ledger.real_time_status();
    assert_eq!(report.overall, Status::Exceeded);
    assert_eq!(report.summary.exceeded, 1);
    assert_eq!(report.summary.approaching, 1);
    assert_eq!(report.alerts.len(), 2);
    assert!(report.alerts.iter().any(|a| a.contains("Budget exceeded")));
    assert!(report.alerts.iter().any(|a| a.contains("Approaching limit")));
}

#[test]
fn restore_rederives_usage_from_history() {
    let mut ledger = setup();
    ledger.record(expense("IT", "Software", 12_000)).unwrap();
    ledger.record(expense("Legal", "Retainers", 999)).unwrap();

    let restored = ExpenseLedger::restore(
        ledger.policy().cloned(),
        ledger.transactions().to_vec(),
    );
    assert_eq!(
        restored.usage_record("IT", "Software").unwrap().spent,
        Decimal::from(12_000)
    );
    assert_eq!(restored.transactions().len(), 2);
}
