// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Breach detection and severity scoring over ledger usage snapshots.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::ledger::ExpenseLedger;
use crate::models::{Breach, BreachState, Severity, SeverityScore};
use crate::thresholds;

/// Holds the append-only breach history. Every detected breach lands here
/// and feeds recurrence counting for later detections; nothing is ever
/// deduplicated or trimmed.
#[derive(Debug, Default)]
pub struct BreachDetector {
    history: Vec<Breach>,
}

impl BreachDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: Vec<Breach>) -> Self {
        BreachDetector { history }
    }

    pub fn history(&self) -> &[Breach] {
        &self.history
    }

    /// Scans current usage for categories at or over their limit and turns
    /// each into a Breach. Re-running on unchanged usage raises the same
    /// breaches again; that is intentional at-least-once behavior.
    pub fn analyze(&mut self, ledger: &ExpenseLedger) -> Result<Vec<Breach>, PipelineError> {
        if ledger.is_empty() {
            return Err(PipelineError::NoData);
        }

        let snapshot = ledger.usage_snapshot();
        let mut found = Vec::new();

        for usage in &snapshot.categories {
            if usage.usage_percent < *thresholds::EXCEEDED_PERCENT {
                continue;
            }
            let recurrence_count = self.recurrence(&usage.department, &usage.category);
            let overage = usage.spent - usage.limit;
            let breach = Breach {
                id: Uuid::new_v4(),
                department: usage.department.clone(),
                category: usage.category.clone(),
                limit: usage.limit,
                spent: usage.spent,
                overage,
                usage_percent: usage.usage_percent,
                overage_percent: usage.usage_percent - Decimal::ONE_HUNDRED,
                severity: Severity::from_usage_percent(usage.usage_percent),
                detected_at: Utc::now(),
                state: BreachState::Active,
                recurrence_count,
                is_recurring: recurrence_count > 0,
                linked_transactions: Self::link_transactions(
                    ledger,
                    &usage.department,
                    &usage.category,
                    overage,
                ),
            };
            tracing::info!(
                department = %breach.department,
                category = %breach.category,
                overage = %breach.overage,
                severity = %breach.severity,
                recurrence = breach.recurrence_count,
                "budget breach detected"
            );
            self.history.push(breach.clone());
            found.push(breach);
        }

        Ok(found)
    }

    /// Recurrence-weighted severity score. The breach's recurrence count is
    /// taken as recorded at detection time, not re-derived from history.
    pub fn score_severity(&self, breach: &Breach) -> SeverityScore {
        let base = (breach.overage_percent / *thresholds::BASE_SCORE_DIVISOR)
            .min(*thresholds::BASE_SCORE_CAP);
        let multiplier = Decimal::ONE
            + *thresholds::RECURRENCE_WEIGHT * Decimal::from(breach.recurrence_count);
        let final_score = base * multiplier;

        SeverityScore {
            breach_id: breach.id,
            overage_percent: breach.overage_percent,
            recurrence_count: breach.recurrence_count,
            base_score: base.round_dp(2),
            recurrence_multiplier: multiplier.round_dp(2),
            final_score: final_score.round_dp(2),
            tier: Severity::from_score(final_score),
        }
    }

    /// The most recent matched transactions, newest first, until their
    /// cumulative amount covers the overage. A breach with any recorded
    /// transactions always links at least the newest one.
    pub fn link_transactions(
        ledger: &ExpenseLedger,
        department: &str,
        category: &str,
        overage: Decimal,
    ) -> Vec<Uuid> {
        let mut txs: Vec<_> = ledger
            .transactions()
            .iter()
            .filter(|t| t.matched && t.department == department && t.category == category)
            .collect();
        txs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        let mut linked = Vec::new();
        let mut covered = Decimal::ZERO;
        for tx in txs {
            linked.push(tx.id);
            covered += tx.amount;
            if covered >= overage {
                break;
            }
        }
        linked
    }

    fn recurrence(&self, department: &str, category: &str) -> u32 {
        self.history
            .iter()
            .filter(|b| b.department == department && b.category == category)
            .count() as u32
    }
}
