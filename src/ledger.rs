// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Expense ledger: the owned tracking context for budget policy, recorded
//! transactions and running per-category usage.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{
    BudgetPolicy, CategoryUsage, DepartmentRollup, NewExpense, Status, StatusReport, StatusRow,
    StatusSummary, Transaction, UsageRecord, UsageSnapshot, usage_percent,
};

#[derive(Debug, Default)]
pub struct ExpenseLedger {
    policy: Option<BudgetPolicy>,
    transactions: Vec<Transaction>,
    usage: BTreeMap<(String, String), UsageRecord>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted policy and transaction history.
    /// Usage totals are re-derived; stored status snapshots are kept as-is.
    pub fn restore(policy: Option<BudgetPolicy>, transactions: Vec<Transaction>) -> Self {
        let mut ledger = ExpenseLedger {
            policy,
            transactions: Vec::new(),
            usage: BTreeMap::new(),
        };
        ledger.seed_usage();
        for tx in transactions {
            if tx.matched {
                let rec = ledger.usage_entry(&tx.department, &tx.category);
                rec.spent += tx.amount;
                rec.transactions.push(tx.id);
            }
            ledger.transactions.push(tx);
        }
        ledger
    }

    /// Replaces the budget policy and resets all usage state. A rejected
    /// policy leaves the previously loaded one untouched.
    pub fn load_policy(&mut self, policy: BudgetPolicy) -> Result<(), PipelineError> {
        for (dept, cat, budget) in policy.iter_categories() {
            if budget.limit.is_sign_negative() {
                return Err(PipelineError::Policy(format!(
                    "negative limit for {dept}/{cat}"
                )));
            }
        }
        tracing::info!(
            departments = policy.departments.len(),
            categories = policy.category_count(),
            "budget policy loaded, usage state reset"
        );
        self.policy = Some(policy);
        self.transactions.clear();
        self.usage.clear();
        self.seed_usage();
        Ok(())
    }

    pub fn policy(&self) -> Option<&BudgetPolicy> {
        self.policy.as_ref()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Validates and stores one expense. Matched transactions update the
    /// category's running total and get a status snapshot attached;
    /// unmatched ones are stored for audit only.
    pub fn record(&mut self, expense: NewExpense) -> Result<Transaction, PipelineError> {
        let department = expense.department.trim().to_string();
        let category = expense.category.trim().to_string();
        if department.is_empty() {
            return Err(PipelineError::Validation(
                "transaction department is required".into(),
            ));
        }
        if category.is_empty() {
            return Err(PipelineError::Validation(
                "transaction category is required".into(),
            ));
        }
        if expense.amount.is_zero() {
            return Err(PipelineError::Validation(
                "transaction amount must be non-zero".into(),
            ));
        }
        if expense.amount.is_sign_negative() && !expense.correction {
            return Err(PipelineError::Validation(
                "negative amount requires the correction flag".into(),
            ));
        }

        let matched = self
            .policy
            .as_ref()
            .map(|p| p.contains(&department, &category))
            .unwrap_or(false);

        let mut tx = Transaction {
            id: Uuid::new_v4(),
            timestamp: expense.timestamp.unwrap_or_else(Utc::now),
            amount: expense.amount,
            department,
            category,
            vendor: expense.vendor.unwrap_or_else(|| "Unknown".to_string()),
            description: expense
                .description
                .unwrap_or_else(|| "No description".to_string()),
            matched,
            status: None,
            usage_percent: None,
        };

        if matched {
            let rec = self.usage_entry(&tx.department, &tx.category);
            rec.spent += tx.amount;
            rec.transactions.push(tx.id);
            let percent = usage_percent(rec.spent, rec.limit);
            tx.status = Some(Status::from_usage_percent(percent));
            tx.usage_percent = Some(percent);
            tracing::debug!(
                department = %tx.department,
                category = %tx.category,
                amount = %tx.amount,
                usage_percent = %percent,
                "expense recorded"
            );
        } else {
            tracing::warn!(
                department = %tx.department,
                category = %tx.category,
                "transaction does not match any policy category, excluded from usage"
            );
        }

        self.transactions.push(tx.clone());
        Ok(tx)
    }

    pub fn usage_record(&self, department: &str, category: &str) -> Option<&UsageRecord> {
        self.usage
            .get(&(department.to_string(), category.to_string()))
    }

    /// Per-category usage rows plus department rollups. Deterministic for a
    /// fixed ledger state.
    pub fn usage_snapshot(&self) -> UsageSnapshot {
        let mut categories = Vec::new();
        let mut by_dept: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();

        for ((dept, cat), rec) in &self.usage {
            let percent = usage_percent(rec.spent, rec.limit);
            categories.push(CategoryUsage {
                department: dept.clone(),
                category: cat.clone(),
                spent: rec.spent,
                limit: rec.limit,
                usage_percent: percent,
                remaining: rec.limit - rec.spent,
                transaction_count: rec.transactions.len(),
            });
            let entry = by_dept.entry(dept).or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 += rec.spent;
            entry.1 += rec.limit;
        }

        let departments = by_dept
            .into_iter()
            .map(|(dept, (spent, limit))| DepartmentRollup {
                department: dept.to_string(),
                spent,
                limit,
                usage_percent: usage_percent(spent, limit),
            })
            .collect();

        UsageSnapshot {
            categories,
            departments,
        }
    }

    /// Usage snapshot with per-category status flags, one alert line per
    /// non-Safe category, and the worst status as the overall flag.
    pub fn real_time_status(&self) -> StatusReport {
        let snapshot = self.usage_snapshot();
        let mut rows = Vec::with_capacity(snapshot.categories.len());
        let mut alerts = Vec::new();
        let mut exceeded = 0usize;
        let mut approaching = 0usize;

        for usage in snapshot.categories {
            let status = Status::from_usage_percent(usage.usage_percent);
            match status {
                Status::Exceeded => {
                    exceeded += 1;
                    alerts.push(format!(
                        "{}/{}: Budget exceeded by {:.1}%",
                        usage.department,
                        usage.category,
                        usage.usage_percent - Decimal::ONE_HUNDRED
                    ));
                }
                Status::Approaching => {
                    approaching += 1;
                    alerts.push(format!(
                        "{}/{}: Approaching limit at {:.1}%",
                        usage.department, usage.category, usage.usage_percent
                    ));
                }
                Status::Safe => {}
            }
            rows.push(StatusRow {
                department: usage.department,
                category: usage.category,
                spent: usage.spent,
                limit: usage.limit,
                usage_percent: usage.usage_percent,
                remaining: usage.remaining,
                status,
                transaction_count: usage.transaction_count,
            });
        }

        let overall = rows.iter().map(|r| r.status).max().unwrap_or(Status::Safe);
        StatusReport {
            overall,
            summary: StatusSummary {
                categories: rows.len(),
                exceeded,
                approaching,
            },
            rows,
            alerts,
        }
    }

    fn seed_usage(&mut self) {
        if let Some(policy) = &self.policy {
            for (dept, cat, budget) in policy.iter_categories() {
                self.usage.insert(
                    (dept.to_string(), cat.to_string()),
                    UsageRecord {
                        spent: Decimal::ZERO,
                        limit: budget.limit,
                        transactions: Vec::new(),
                    },
                );
            }
        }
    }

    fn usage_entry(&mut self, department: &str, category: &str) -> &mut UsageRecord {
        let limit = self
            .policy
            .as_ref()
            .and_then(|p| p.category(department, category))
            .map(|b| b.limit)
            .unwrap_or(Decimal::ZERO);
        self.usage
            .entry((department.to_string(), category.to_string()))
            .or_insert_with(|| UsageRecord {
                spent: Decimal::ZERO,
                limit,
                transactions: Vec::new(),
            })
    }
}
