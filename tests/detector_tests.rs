// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use spendguard::detector::BreachDetector;
use spendguard::error::PipelineError;
use spendguard::ledger::ExpenseLedger;
use spendguard::models::{BudgetPolicy, CategoryBudget, NewExpense, Period, Severity};

fn ledger_with(limit: i64) -> ExpenseLedger {
    let mut p = BudgetPolicy::default();
    p.insert("IT", "Software", CategoryBudget {
        limit: Decimal::from(limit),
        period: Period::Monthly,
    });
    let mut ledger = ExpenseLedger::new();
    ledger.load_policy(p).unwrap();
    ledger
}

fn spend(ledger: &mut ExpenseLedger, amount: i64) {
    ledger
        .record(NewExpense {
            amount: Decimal::from(amount),
            department: "IT".to_string(),
            category: "Software".to_string(),
            ..Default::default()
        })
        .unwrap();
}

#[test]
fn basic_breach_scenario() {
    let mut ledger = ledger_with(20_000);
    spend(&mut ledger, 15_000);
    spend(&mut ledger, 6_000);

    let mut detector = BreachDetector::new();
    let breaches = detector.analyze(&ledger).unwrap();
    assert_eq!(breaches.len(), 1);

    let b = &breaches[0];
    assert_eq!(b.spent, Decimal::from(21_000));
    assert_eq!(b.usage_percent, Decimal::from(105));
    assert_eq!(b.overage, Decimal::from(1_000));
    assert_eq!(b.overage_percent, Decimal::from(5));
    assert_eq!(b.severity, Severity::Low); // below the 110 band
    assert_eq!(b.recurrence_count, 0);
    assert!(!b.is_recurring);
}

#[test]
fn severity_label_bands() {
    for (spent, expected) in [
        (21_000, Severity::Low),      // 105%
        (22_000, Severity::Medium),   // 110%
        (25_000, Severity::High),     // 125%
        (30_000, Severity::Critical), // 150%
    ] {
        let mut ledger = ledger_with(20_000);
        spend(&mut ledger, spent);
        let mut detector = BreachDetector::new();
        let breaches = detector.analyze(&ledger).unwrap();
        assert_eq!(breaches[0].severity, expected, "at spend {}", spent);
    }
}

#[test]
fn score_formula_and_cap() {
    let mut ledger = ledger_with(10_000);
    spend(&mut ledger, 14_000); // 40% over -> base 4.0

    let mut detector = BreachDetector::new();
    let breaches = detector.analyze(&ledger).unwrap();
    let score = detector.score_severity(&breaches[0]);
    assert_eq!(score.base_score, Decimal::from(4));
    assert_eq!(score.recurrence_multiplier, Decimal::ONE);
    assert_eq!(score.final_score, Decimal::from(4));
    assert_eq!(score.tier, Severity::Medium);

    // 300% over caps the base at 10
    let mut ledger = ledger_with(10_000);
    spend(&mut ledger, 40_000);
    let mut detector = BreachDetector::new();
    let breaches = detector.analyze(&ledger).unwrap();
    let score = detector.score_severity(&breaches[0]);
    assert_eq!(score.base_score, Decimal::from(10));
    assert_eq!(score.tier, Severity::Critical);
}

#[test]
fn recurrence_strictly_increases_score() {
    let mut ledger = ledger_with(20_000);
    spend(&mut ledger, 21_000);

    let mut detector = BreachDetector::new();
    let first = detector.analyze(&ledger).unwrap().remove(0);
    let second = detector.analyze(&ledger).unwrap().remove(0);

    assert_eq!(first.overage_percent, second.overage_percent);
    assert_eq!(second.recurrence_count, 1);
    assert!(second.is_recurring);

    let s1 = detector.score_severity(&first);
    let s2 = detector.score_severity(&second);
    assert_eq!(s2.recurrence_multiplier, Decimal::new(12, 1));
    assert!(s2.final_score > s1.final_score);
}

#[test]
fn recurrence_counts_only_matching_category() {
    let mut p = BudgetPolicy::default();
    p.insert("IT", "Software", CategoryBudget {
        limit: Decimal::from(1_000),
        period: Period::Monthly,
    });
    p.insert("HR", "Training", CategoryBudget {
        limit: Decimal::from(1_000),
        period: Period::Monthly,
    });
    let mut ledger = ExpenseLedger::new();
    ledger.load_policy(p).unwrap();
    for (dept, cat) in [("IT", "Software"), ("HR", "Training")] {
        ledger
            .record(NewExpense {
                amount: Decimal::from(1_500),
                department: dept.to_string(),
                category: cat.to_string(),
                ..Default::default()
            })
            .unwrap();
    }

    let mut detector = BreachDetector::new();
    let first_run = detector.analyze(&ledger).unwrap();
    assert_eq!(first_run.len(), 2);
    assert!(first_run.iter().all(|b| b.recurrence_count == 0));

    let second_run = detector.analyze(&ledger).unwrap();
    assert!(second_run.iter().all(|b| b.recurrence_count == 1));
    assert_eq!(detector.history().len(), 4);
}

#[test]
fn analyze_on_empty_ledger_is_no_data() {
    let ledger = ledger_with(20_000);
    let mut detector = BreachDetector::new();
    let err = detector.analyze(&ledger).unwrap_err();
    assert!(matches!(err, PipelineError::NoData));
}

#[test]
fn every_breach_lands_in_history() {
    let mut ledger = ledger_with(20_000);
    spend(&mut ledger, 25_000);

    let mut detector = BreachDetector::new();
    detector.analyze(&ledger).unwrap();
    detector.analyze(&ledger).unwrap();
    detector.analyze(&ledger).unwrap();
    assert_eq!(detector.history().len(), 3);
}

#[test]
fn linking_walks_recent_first_until_overage_covered() {
    let mut ledger = ledger_with(10_000);
    let times: Vec<_> = (0..4)
        .map(|h| Utc.with_ymd_and_hms(2025, 6, 1, 8 + h, 0, 0).unwrap())
        .collect();
    for (i, amount) in [4_000i64, 4_000, 2_500, 1_500].iter().enumerate() {
        ledger
            .record(NewExpense {
                amount: Decimal::from(*amount),
                department: "IT".to_string(),
                category: "Software".to_string(),
                timestamp: Some(times[i]),
                ..Default::default()
            })
            .unwrap();
    }
    // spent 12,000 against 10,000: overage 2,000

    let mut detector = BreachDetector::new();
    let breach = detector.analyze(&ledger).unwrap().remove(0);

    // Newest (1,500) does not cover 2,000 alone; the next one (2,500) does.
    assert_eq!(breach.linked_transactions.len(), 2);
    let txs = ledger.transactions();
    assert_eq!(breach.linked_transactions[0], txs[3].id);
    assert_eq!(breach.linked_transactions[1], txs[2].id);
}

#[test]
fn linking_always_includes_newest_when_transactions_exist() {
    // Exactly at the limit: overage is zero, one transaction still linked
    let mut ledger = ledger_with(10_000);
    spend(&mut ledger, 10_000);

    let mut detector = BreachDetector::new();
    let breach = detector.analyze(&ledger).unwrap().remove(0);
    assert_eq!(breach.overage, Decimal::ZERO);
    assert_eq!(breach.linked_transactions.len(), 1);
}

#[test]
fn linking_ties_broken_by_transaction_id() {
    let mut ledger = ledger_with(1_000);
    let same_time = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    for _ in 0..3 {
        ledger
            .record(NewExpense {
                amount: Decimal::from(600),
                department: "IT".to_string(),
                category: "Software".to_string(),
                timestamp: Some(same_time),
                ..Default::default()
            })
            .unwrap();
    }
    // overage 800: two transactions cover it

    let mut detector = BreachDetector::new();
    let breach = detector.analyze(&ledger).unwrap().remove(0);
    assert_eq!(breach.linked_transactions.len(), 2);
    // Equal timestamps fall back to descending id order
    assert!(breach.linked_transactions[0] > breach.linked_transactions[1]);
}
