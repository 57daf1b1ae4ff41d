// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stakeholder escalation: notifications, executive summary and role-based
//! action requests with SLA due dates.

use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::boundary::{NotificationTransport, TextGenerator, extract_json_block, fallback_narrative};
use crate::error::PipelineError;
use crate::models::{
    ActionRequest, Breach, BreachDigest, BusinessImpact, DeliveryReceipt, DeliveryStatus,
    EscalationReport, ExecutiveSummary, Notification, Priority, Recommendation,
    RecommendationDetail, RiskLevel, Role, Severity, Urgency,
};
use crate::thresholds;

#[derive(Debug, Default)]
pub struct EscalationCoordinator {
    receipts: Vec<DeliveryReceipt>,
}

impl EscalationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivery history across all dispatches in this coordinator's lifetime.
    pub fn receipts(&self) -> &[DeliveryReceipt] {
        &self.receipts
    }

    /// Full escalation cycle: one notification per breach, dispatched, then
    /// summarized for executives with per-role action requests.
    pub fn escalate(
        &mut self,
        breaches: &[Breach],
        recommendations: &[Recommendation],
        generator: &dyn TextGenerator,
        transport: &dyn NotificationTransport,
    ) -> Result<EscalationReport, PipelineError> {
        if breaches.is_empty() {
            return Err(PipelineError::NoBreach);
        }

        let notifications: Vec<Notification> = breaches
            .iter()
            .map(|b| self.build_notification(b, recommendations, generator))
            .collect();
        let receipts: Vec<DeliveryReceipt> = notifications
            .iter()
            .map(|n| self.dispatch(n, transport))
            .collect();
        let summary = self.build_executive_summary(&notifications);
        let action_requests = self.build_action_requests(&summary);

        tracing::info!(
            notifications = notifications.len(),
            action_requests = action_requests.len(),
            priority = %summary.priority,
            "escalation cycle complete"
        );
        Ok(EscalationReport {
            notifications,
            receipts,
            summary,
            action_requests,
        })
    }

    /// Builds the stakeholder notification for one breach. Generator
    /// failures degrade to the deterministic template and are flagged.
    pub fn build_notification(
        &self,
        breach: &Breach,
        recommendations: &[Recommendation],
        generator: &dyn TextGenerator,
    ) -> Notification {
        let urgency = notification_urgency(breach);
        let escalation_required = matches!(urgency, Urgency::High | Urgency::Critical);

        let (narrative, degraded) = match generator.breach_summary(breach) {
            Ok(raw) => match extract_json_block(&raw)
                .and_then(|v| v.get("summary").and_then(|s| s.as_str()).map(String::from))
            {
                Some(summary) => (summary, false),
                None => {
                    tracing::warn!(
                        breach = %breach.id,
                        "generator output was not usable JSON, using template narrative"
                    );
                    (fallback_narrative(breach), true)
                }
            },
            Err(e) => {
                tracing::warn!(breach = %breach.id, error = %e, "text generator call failed");
                (fallback_narrative(breach), true)
            }
        };

        let mut stakeholders = vec![
            "Finance Team".to_string(),
            format!("{} Manager", breach.department),
        ];
        if escalation_required {
            stakeholders.push("Finance Director".to_string());
            stakeholders.push("Executive Team".to_string());
        }

        Notification {
            id: Uuid::new_v4(),
            breach_id: breach.id,
            department: breach.department.clone(),
            category: breach.category.clone(),
            severity: breach.severity,
            urgency,
            limit: breach.limit,
            spent: breach.spent,
            overage: breach.overage,
            overage_percent: breach.overage_percent,
            is_recurring: breach.is_recurring,
            detected_at: breach.detected_at,
            subject: render_subject(urgency, &breach.department, breach.severity),
            narrative,
            degraded,
            business_impact: BusinessImpact {
                financial_impact: format!("${:.2} over budget", breach.overage),
                operational_risk: operational_risk(breach),
                compliance_concern: breach.overage_percent
                    > *thresholds::URGENCY_HIGH_OVERAGE_PERCENT,
            },
            recommended_actions: relevant_actions(breach, recommendations),
            escalation_required,
            stakeholders,
            created_at: Utc::now(),
        }
    }

    /// Hands the rendered notification to the transport. Delivery failures
    /// are recorded, never propagated.
    pub fn dispatch(
        &mut self,
        notification: &Notification,
        transport: &dyn NotificationTransport,
    ) -> DeliveryReceipt {
        let body = render_body(notification);
        let receipt = match transport.send(&notification.subject, &body, &notification.stakeholders)
        {
            Ok(()) => DeliveryReceipt {
                notification_id: notification.id,
                status: DeliveryStatus::Sent,
                detail: "notification sent successfully".to_string(),
                sent_at: Utc::now(),
            },
            Err(e) => {
                tracing::warn!(notification = %notification.id, error = %e, "delivery failed");
                DeliveryReceipt {
                    notification_id: notification.id,
                    status: DeliveryStatus::Failed,
                    detail: format!("failed to send notification: {e}"),
                    sent_at: Utc::now(),
                }
            }
        };
        self.receipts.push(receipt.clone());
        receipt
    }

    pub fn build_executive_summary(&self, notifications: &[Notification]) -> ExecutiveSummary {
        let total_overage: Decimal = notifications.iter().map(|n| n.overage).sum();
        let departments: BTreeSet<&str> =
            notifications.iter().map(|n| n.department.as_str()).collect();
        let critical_breaches = notifications
            .iter()
            .filter(|n| matches!(n.severity, Severity::Critical | Severity::High))
            .count();
        let immediate_actions: Vec<BreachDigest> = notifications
            .iter()
            .filter(|n| n.escalation_required)
            .map(|n| BreachDigest {
                department: n.department.clone(),
                category: n.category.clone(),
                overage: n.overage,
                severity: n.severity,
                requires_immediate_action: true,
            })
            .collect();
        let departments_affected: Vec<String> =
            departments.iter().map(|d| d.to_string()).collect();

        ExecutiveSummary {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            total_overage,
            key_findings: vec![
                format!("${total_overage:.2} in total budget overages detected"),
                format!(
                    "{} departments affected: {}",
                    departments_affected.len(),
                    departments_affected.join(", ")
                ),
                format!("{critical_breaches} critical breaches requiring immediate attention"),
            ],
            departments_affected,
            critical_breaches,
            priority: if critical_breaches > 0 {
                Priority::High
            } else {
                Priority::Medium
            },
            immediate_actions,
            financial_recommendations: vec![
                "Implement immediate spending freeze on affected categories".to_string(),
                "Initiate budget reallocation from surplus categories".to_string(),
                "Schedule emergency budget review meeting within 48 hours".to_string(),
            ],
            next_steps: vec![
                "Department managers to provide corrective action plans".to_string(),
                "Finance team to identify reallocation opportunities".to_string(),
                "Weekly monitoring until budgets are back on track".to_string(),
            ],
            timeline: "Immediate action required within 24 hours".to_string(),
        }
    }

    /// One request per finance role, due now + the role's SLA. Everyone
    /// escalates to the Executive Team; the Executive Team escalates to the
    /// board.
    pub fn build_action_requests(&self, summary: &ExecutiveSummary) -> Vec<ActionRequest> {
        let now = Utc::now();
        Role::ALL
            .iter()
            .map(|role| ActionRequest {
                id: Uuid::new_v4(),
                role: *role,
                priority: summary.priority,
                due_by: now + Duration::hours(role.sla_hours()),
                actions: role_actions(*role),
                deliverables: role_deliverables(*role),
                total_overage: summary.total_overage,
                departments_affected: summary.departments_affected.len(),
                critical_breaches: summary.critical_breaches,
                escalation_path: if *role == Role::ExecutiveTeam {
                    "Board of Directors".to_string()
                } else {
                    "Executive Team".to_string()
                },
            })
            .collect()
    }
}

fn notification_urgency(breach: &Breach) -> Urgency {
    if breach.severity == Severity::Critical
        || breach.overage_percent > *thresholds::URGENCY_CRITICAL_OVERAGE_PERCENT
        || breach.is_recurring
    {
        Urgency::Critical
    } else if breach.severity == Severity::High
        || breach.overage_percent > *thresholds::URGENCY_HIGH_OVERAGE_PERCENT
    {
        Urgency::High
    } else {
        Urgency::Medium
    }
}

fn operational_risk(breach: &Breach) -> RiskLevel {
    let category = breach.category.to_lowercase();
    if category.contains("critical")
        || category.contains("infrastructure")
        || breach.overage_percent > *thresholds::URGENCY_CRITICAL_OVERAGE_PERCENT
    {
        RiskLevel::High
    } else if breach.overage_percent > *thresholds::URGENCY_HIGH_OVERAGE_PERCENT {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Headline actions for the notification: drawn from the breach's own
/// recommendations when available, otherwise a fixed default checklist.
fn relevant_actions(breach: &Breach, recommendations: &[Recommendation]) -> Vec<String> {
    let mut actions = Vec::new();
    for rec in recommendations.iter().filter(|r| r.breach_id == breach.id) {
        match &rec.detail {
            RecommendationDetail::Reallocation {
                recommended_action, ..
            } => actions.push(recommended_action.clone()),
            RecommendationDetail::SpendingPause { options } => {
                if let Some(o) = options.first() {
                    actions.push(format!("{} ({})", o.action, o.scope));
                }
            }
            RecommendationDetail::VendorRenegotiation { options, .. } => {
                if let Some(o) = options.first() {
                    actions.push(format!("{}: {}", o.strategy, o.approach));
                }
            }
        }
        if actions.len() >= 4 {
            break;
        }
    }
    if actions.is_empty() {
        return vec![
            format!(
                "Implement immediate spending freeze for {}",
                breach.category
            ),
            format!(
                "Review and approve all {} purchases over $100",
                breach.category
            ),
            "Identify budget reallocation opportunities from other categories".to_string(),
            "Schedule vendor renegotiation meeting within 5 business days".to_string(),
        ];
    }
    actions.truncate(4);
    actions
}

fn role_actions(role: Role) -> Vec<String> {
    let actions: &[&str] = match role {
        Role::DepartmentManager => &[
            "Provide immediate spending freeze implementation plan",
            "Identify non-essential expenses that can be postponed",
            "Submit corrective action plan within 24 hours",
        ],
        Role::FinanceDirector => &[
            "Approve emergency budget reallocation requests",
            "Review department budget allocations for Q4",
            "Coordinate with department managers on corrective actions",
        ],
        Role::ProcurementTeam => &[
            "Initiate vendor renegotiation processes",
            "Review contract terms for cost reduction opportunities",
            "Provide alternative vendor recommendations",
        ],
        Role::ExecutiveTeam => &[
            "Review overall budget strategy and controls",
            "Approve major budget reallocations",
            "Communicate with board if necessary",
        ],
    };
    actions.iter().map(|s| s.to_string()).collect()
}

fn role_deliverables(role: Role) -> Vec<String> {
    let deliverables: &[&str] = match role {
        Role::DepartmentManager => &[
            "Corrective action plan document",
            "List of postponed/cancelled expenses",
            "Updated spending forecast",
        ],
        Role::FinanceDirector => &[
            "Budget reallocation approval decisions",
            "Updated budget monitoring procedures",
            "Risk assessment report",
        ],
        Role::ProcurementTeam => &[
            "Vendor renegotiation timeline",
            "Cost reduction proposals",
            "Alternative vendor analysis",
        ],
        Role::ExecutiveTeam => &[
            "Strategic budget review summary",
            "Governance improvement recommendations",
            "Communication plan for stakeholders",
        ],
    };
    deliverables.iter().map(|s| s.to_string()).collect()
}

fn render_subject(urgency: Urgency, department: &str, severity: Severity) -> String {
    let prefix = match urgency {
        Urgency::Critical => "🚨 CRITICAL",
        Urgency::High => "⚠️ URGENT",
        _ => "📊",
    };
    format!("{prefix} Budget Breach Alert - {department} Department ({severity} Severity)")
}

/// Plain-text notification body handed to the transport.
pub fn render_body(n: &Notification) -> String {
    let mut body = String::new();
    body.push_str("Budget Breach Notification\n\n");
    body.push_str("Breach Summary\n");
    body.push_str(&format!("  Department: {}\n", n.department));
    body.push_str(&format!("  Category: {}\n", n.category));
    body.push_str(&format!("  Overage Amount: ${:.2}\n", n.overage));
    body.push_str(&format!("  Severity: {}\n", n.severity));
    body.push_str(&format!("  Detection Time: {}\n\n", n.detected_at.to_rfc3339()));
    body.push_str("Financial Details\n");
    body.push_str(&format!("  Budget Limit: ${:.2}\n", n.limit));
    body.push_str(&format!("  Total Spent: ${:.2}\n", n.spent));
    body.push_str(&format!("  Percentage Over: {:.1}%\n", n.overage_percent));
    body.push_str(&format!(
        "  Recurring Issue: {}\n\n",
        if n.is_recurring { "Yes" } else { "No" }
    ));
    body.push_str("Business Impact\n");
    body.push_str(&format!(
        "  Financial Impact: {}\n",
        n.business_impact.financial_impact
    ));
    body.push_str(&format!(
        "  Operational Risk: {}\n",
        n.business_impact.operational_risk
    ));
    body.push_str(&format!(
        "  Compliance Concern: {}\n\n",
        if n.business_impact.compliance_concern {
            "Yes"
        } else {
            "No"
        }
    ));
    body.push_str("Summary\n");
    body.push_str(&format!("  {}\n\n", n.narrative));
    body.push_str("Recommended Actions\n");
    for (i, action) in n.recommended_actions.iter().enumerate() {
        body.push_str(&format!("  {}. {}\n", i + 1, action));
    }
    body.push_str(
        "\nPlease review the breach details and implement the recommended corrective actions \
         immediately. Contact the finance team if you need assistance with budget reallocation \
         or vendor renegotiation.\n\nThis is an automated alert from the Spendguard system.\n",
    );
    body
}
