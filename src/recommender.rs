// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Corrective strategy generation: reallocation, spending pauses and vendor
//! renegotiation, gated by breach context.

use chrono::Utc;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{
    ApprovalTier, Breach, BreachContext, FocusArea, PauseOption, Priority, ReallocationOption,
    Recommendation, RecommendationDetail, RenegotiationOption, RiskLevel, Severity, StartWindow,
    Trend, Urgency,
};
use crate::thresholds;

#[derive(Debug, Default)]
pub struct RecommendationEngine {
    log: Vec<Recommendation>,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recommendations emitted so far, for audit retrieval.
    pub fn log(&self) -> &[Recommendation] {
        &self.log
    }

    /// Derives urgency, spending trend and optimization focus for one breach.
    pub fn analyze_context(&self, breach: &Breach) -> BreachContext {
        let urgency = if breach.severity == Severity::Critical || breach.recurrence_count > 2 {
            Urgency::Critical
        } else if breach.severity == Severity::High || breach.recurrence_count > 1 {
            Urgency::High
        } else if breach.severity == Severity::Medium {
            Urgency::Medium
        } else {
            Urgency::Low
        };
        let trend = if breach.recurrence_count > 1 {
            Trend::Increasing
        } else {
            Trend::FirstTime
        };
        let focus = if matches!(breach.severity, Severity::Critical | Severity::High) {
            FocusArea::ImmediateCostReduction
        } else {
            FocusArea::ProcessOptimization
        };

        BreachContext {
            breach_id: breach.id,
            department: breach.department.clone(),
            category: breach.category.clone(),
            overage: breach.overage,
            overage_percent: breach.overage_percent,
            severity: breach.severity,
            recurrence_count: breach.recurrence_count,
            is_recurring: breach.is_recurring,
            trend,
            urgency,
            focus,
        }
    }

    /// Emits the three strategy families for every breach. Each emitted
    /// recommendation points back at exactly one breach.
    pub fn generate(&mut self, breaches: &[Breach]) -> Result<Vec<Recommendation>, PipelineError> {
        if breaches.is_empty() {
            return Err(PipelineError::NoBreach);
        }

        let mut out = Vec::with_capacity(breaches.len() * 3);
        for breach in breaches {
            let ctx = self.analyze_context(breach);
            tracing::debug!(
                department = %ctx.department,
                category = %ctx.category,
                urgency = %ctx.urgency,
                trend = %ctx.trend,
                "breach context analyzed"
            );
            out.push(self.reallocation_options(&ctx));
            out.push(self.spending_pause_options(&ctx));
            out.push(self.vendor_renegotiation_options(&ctx));
        }
        self.log.extend(out.iter().cloned());
        tracing::info!(
            breaches = breaches.len(),
            recommendations = out.len(),
            "recommendations generated"
        );
        Ok(out)
    }

    /// Two sourcing options differing in approval tier and timeline. The
    /// contingency route covers the full overage; the cross-department
    /// route covers only part of it.
    pub fn reallocation_options(&self, ctx: &BreachContext) -> Recommendation {
        let options = vec![
            ReallocationOption {
                source: format!("{}_Contingency", ctx.department),
                available: ctx.overage * *thresholds::CONTINGENCY_AVAILABLE_RATIO,
                transfer: ctx.overage,
                impact: RiskLevel::Low,
                approval: ApprovalTier::Manager,
                timeline: "1-2 days".to_string(),
            },
            ReallocationOption {
                source: "Other_Department_Surplus".to_string(),
                available: ctx.overage * *thresholds::SURPLUS_AVAILABLE_RATIO,
                transfer: ctx.overage * *thresholds::SURPLUS_AVAILABLE_RATIO,
                impact: RiskLevel::Medium,
                approval: ApprovalTier::Director,
                timeline: "3-5 days".to_string(),
            },
        ];
        let priority = if ctx.urgency == Urgency::Critical {
            Priority::High
        } else {
            Priority::Medium
        };

        self.recommendation(
            ctx,
            RecommendationDetail::Reallocation {
                options,
                recommended_action: format!(
                    "Transfer ${:.2} from {} contingency fund",
                    ctx.overage, ctx.department
                ),
                priority,
            },
        )
    }

    /// Severity-gated pause suggestions. Critical/High get a freeze plus a
    /// payment-terms extension, Medium/High get a selective vendor pause,
    /// Low gets an empty but valid option list.
    pub fn spending_pause_options(&self, ctx: &BreachContext) -> Recommendation {
        let mut options = Vec::new();
        if matches!(ctx.severity, Severity::Critical | Severity::High) {
            options.push(PauseOption {
                action: "Immediate freeze on all non-essential spending".to_string(),
                scope: format!(
                    "All {} purchases over ${}",
                    ctx.category,
                    *thresholds::SPENDING_FREEZE_FLOOR
                ),
                duration: "30 days".to_string(),
                detail: None,
                exceptions: Some("Emergency purchases only".to_string()),
                approval: Some(ApprovalTier::Director),
                expected_effect: "60-80% reduction".to_string(),
            });
            options.push(PauseOption {
                action: "Vendor payment terms extension".to_string(),
                scope: format!("All {} vendors", ctx.category),
                duration: "45 days".to_string(),
                detail: Some(
                    "Negotiate extended payment terms to improve cash flow".to_string(),
                ),
                exceptions: None,
                approval: None,
                expected_effect: "15-20% budget relief".to_string(),
            });
        }
        if matches!(ctx.severity, Severity::Medium | Severity::High) {
            options.push(PauseOption {
                action: "Selective vendor pause".to_string(),
                scope: format!("Top 3 {} vendors by spend", ctx.category),
                duration: "14 days".to_string(),
                detail: Some(
                    "Pause orders from highest-cost vendors while maintaining essential services"
                        .to_string(),
                ),
                exceptions: None,
                approval: None,
                expected_effect: "30-40% reduction".to_string(),
            });
        }

        self.recommendation(ctx, RecommendationDetail::SpendingPause { options })
    }

    /// Three renegotiation strategies with distinct savings targets and
    /// success estimates; the start window tightens with urgency.
    pub fn vendor_renegotiation_options(&self, ctx: &BreachContext) -> Recommendation {
        let options = vec![
            RenegotiationOption {
                strategy: "Volume discount renegotiation".to_string(),
                approach: format!(
                    "Leverage current {} spending volume for better rates",
                    ctx.category
                ),
                target_savings: (ctx.overage * *thresholds::VOLUME_DISCOUNT_SAVINGS_RATIO)
                    .round_dp(2),
                timeline: "2-3 weeks".to_string(),
                success_probability: thresholds::VOLUME_DISCOUNT_SUCCESS,
                negotiation_points: vec![
                    "Annual spending commitment".to_string(),
                    "Multi-year contract terms".to_string(),
                    "Payment terms optimization".to_string(),
                ],
            },
            RenegotiationOption {
                strategy: "Service scope adjustment".to_string(),
                approach: format!("Reduce {} service levels or features", ctx.category),
                target_savings: (ctx.overage * *thresholds::SCOPE_ADJUSTMENT_SAVINGS_RATIO)
                    .round_dp(2),
                timeline: "1-2 weeks".to_string(),
                success_probability: thresholds::SCOPE_ADJUSTMENT_SUCCESS,
                negotiation_points: vec![
                    "Remove premium features".to_string(),
                    "Reduce service frequency".to_string(),
                    "Minimize customizations".to_string(),
                ],
            },
            RenegotiationOption {
                strategy: "Competitive bidding".to_string(),
                approach: format!("Request quotes from alternative {} vendors", ctx.category),
                target_savings: (ctx.overage * *thresholds::COMPETITIVE_BID_SAVINGS_RATIO)
                    .round_dp(2),
                timeline: "3-4 weeks".to_string(),
                success_probability: thresholds::COMPETITIVE_BID_SUCCESS,
                negotiation_points: vec![
                    "Market rate comparison".to_string(),
                    "Switching cost analysis".to_string(),
                    "Trial period negotiation".to_string(),
                ],
            },
        ];
        let start_window = match ctx.urgency {
            Urgency::Critical => StartWindow::Immediate,
            Urgency::High => StartWindow::ThreeDays,
            _ => StartWindow::OneWeek,
        };

        self.recommendation(
            ctx,
            RecommendationDetail::VendorRenegotiation {
                options,
                negotiation_goal: format!(
                    "Reduce {} costs by ${:.2} monthly",
                    ctx.category, ctx.overage
                ),
                start_window,
                escalation_path: vec![
                    "Department Manager".to_string(),
                    "Procurement Team".to_string(),
                    "Director".to_string(),
                ],
            },
        )
    }

    fn recommendation(&self, ctx: &BreachContext, detail: RecommendationDetail) -> Recommendation {
        Recommendation {
            id: Uuid::new_v4(),
            breach_id: ctx.breach_id,
            department: ctx.department.clone(),
            category: ctx.category.clone(),
            required_amount: ctx.overage,
            urgency: ctx.urgency,
            detail,
            created_at: Utc::now(),
        }
    }
}
