// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::thresholds;

/// Usage percent with the zero-limit guard: a category with no configured
/// limit always reports 0 rather than dividing by zero.
pub fn usage_percent(spent: Decimal, limit: Decimal) -> Decimal {
    if limit.is_zero() {
        return Decimal::ZERO;
    }
    (spent / limit * Decimal::ONE_HUNDRED).round_dp(2)
}

// --- Budget policy ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
    Annual,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Monthly => "monthly",
            Period::Annual => "annual",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub limit: Decimal,
    #[serde(default)]
    pub period: Period,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Department {
    pub categories: std::collections::BTreeMap<String, CategoryBudget>,
}

/// Department -> category -> limit tree. Replacing it resets all derived
/// usage state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetPolicy {
    pub departments: std::collections::BTreeMap<String, Department>,
}

impl BudgetPolicy {
    pub fn insert(&mut self, department: &str, category: &str, budget: CategoryBudget) {
        self.departments
            .entry(department.to_string())
            .or_default()
            .categories
            .insert(category.to_string(), budget);
    }

    pub fn category(&self, department: &str, category: &str) -> Option<&CategoryBudget> {
        self.departments
            .get(department)
            .and_then(|d| d.categories.get(category))
    }

    pub fn contains(&self, department: &str, category: &str) -> bool {
        self.category(department, category).is_some()
    }

    pub fn category_count(&self) -> usize {
        self.departments.values().map(|d| d.categories.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.category_count() == 0
    }

    pub fn iter_categories(&self) -> impl Iterator<Item = (&str, &str, &CategoryBudget)> {
        self.departments.iter().flat_map(|(dept, d)| {
            d.categories
                .iter()
                .map(move |(cat, b)| (dept.as_str(), cat.as_str(), b))
        })
    }
}

// --- Transactions ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub department: String,
    pub category: String,
    pub vendor: String,
    pub description: String,
    /// False when (department, category) is absent from the policy; the
    /// transaction is kept for audit but excluded from usage totals.
    pub matched: bool,
    /// Status snapshot at record time, not updated retroactively.
    pub status: Option<Status>,
    pub usage_percent: Option<Decimal>,
}

/// Incoming expense before validation. Missing vendor, description and
/// timestamp are filled with defaults at record time.
#[derive(Debug, Clone, Default)]
pub struct NewExpense {
    pub amount: Decimal,
    pub department: String,
    pub category: String,
    pub vendor: Option<String>,
    pub description: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Negative amounts are rejected unless this is set.
    pub correction: bool,
}

// --- Usage and status ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Safe,
    Approaching,
    Exceeded,
}

impl Status {
    pub fn from_usage_percent(percent: Decimal) -> Status {
        if percent >= *thresholds::EXCEEDED_PERCENT {
            Status::Exceeded
        } else if percent >= *thresholds::APPROACHING_PERCENT {
            Status::Approaching
        } else {
            Status::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Safe => "Safe",
            Status::Approaching => "Approaching",
            Status::Exceeded => "Exceeded",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running totals per (department, category). Re-derivable from the
/// transaction history at any time.
#[derive(Debug, Clone, Default)]
pub struct UsageRecord {
    pub spent: Decimal,
    pub limit: Decimal,
    pub transactions: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryUsage {
    pub department: String,
    pub category: String,
    pub spent: Decimal,
    pub limit: Decimal,
    pub usage_percent: Decimal,
    pub remaining: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentRollup {
    pub department: String,
    pub spent: Decimal,
    pub limit: Decimal,
    pub usage_percent: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageSnapshot {
    pub categories: Vec<CategoryUsage>,
    pub departments: Vec<DepartmentRollup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusRow {
    pub department: String,
    pub category: String,
    pub spent: Decimal,
    pub limit: Decimal,
    pub usage_percent: Decimal,
    pub remaining: Decimal,
    pub status: Status,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub categories: usize,
    pub exceeded: usize,
    pub approaching: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub overall: Status,
    pub rows: Vec<StatusRow>,
    pub alerts: Vec<String>,
    pub summary: StatusSummary,
}

// --- Breaches ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Coarse label from raw usage percent, attached at detection time.
    pub fn from_usage_percent(percent: Decimal) -> Severity {
        if percent >= *thresholds::SEVERITY_CRITICAL_PERCENT {
            Severity::Critical
        } else if percent >= *thresholds::SEVERITY_HIGH_PERCENT {
            Severity::High
        } else if percent >= *thresholds::SEVERITY_MEDIUM_PERCENT {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Tier from the recurrence-weighted final score.
    pub fn from_score(score: Decimal) -> Severity {
        if score >= *thresholds::SCORE_CRITICAL {
            Severity::Critical
        } else if score >= *thresholds::SCORE_HIGH {
            Severity::High
        } else if score >= *thresholds::SCORE_MEDIUM {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreachState {
    Active,
}

/// Immutable snapshot of an overage event. Recurrence fields are filled at
/// detection time from the detector's history and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breach {
    pub id: Uuid,
    pub department: String,
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub overage: Decimal,
    pub usage_percent: Decimal,
    pub overage_percent: Decimal,
    pub severity: Severity,
    pub detected_at: DateTime<Utc>,
    pub state: BreachState,
    pub recurrence_count: u32,
    pub is_recurring: bool,
    pub linked_transactions: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeverityScore {
    pub breach_id: Uuid,
    pub overage_percent: Decimal,
    pub recurrence_count: u32,
    pub base_score: Decimal,
    pub recurrence_multiplier: Decimal,
    pub final_score: Decimal,
    pub tier: Severity,
}

// --- Recommendations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
            Urgency::Critical => "Critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "First Time")]
    FirstTime,
    Increasing,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::FirstTime => "First Time",
            Trend::Increasing => "Increasing",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    #[serde(rename = "Immediate_Cost_Reduction")]
    ImmediateCostReduction,
    #[serde(rename = "Process_Optimization")]
    ProcessOptimization,
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FocusArea::ImmediateCostReduction => "Immediate_Cost_Reduction",
            FocusArea::ProcessOptimization => "Process_Optimization",
        })
    }
}

/// Per-breach analysis that drives option selection downstream.
#[derive(Debug, Clone, Serialize)]
pub struct BreachContext {
    pub breach_id: Uuid,
    pub department: String,
    pub category: String,
    pub overage: Decimal,
    pub overage_percent: Decimal,
    pub severity: Severity,
    pub recurrence_count: u32,
    pub is_recurring: bool,
    pub trend: Trend,
    pub urgency: Urgency,
    pub focus: FocusArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalTier {
    Manager,
    Director,
}

impl fmt::Display for ApprovalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApprovalTier::Manager => "Manager",
            ApprovalTier::Director => "Director",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReallocationOption {
    pub source: String,
    pub available: Decimal,
    pub transfer: Decimal,
    pub impact: RiskLevel,
    pub approval: ApprovalTier,
    pub timeline: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PauseOption {
    pub action: String,
    pub scope: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalTier>,
    pub expected_effect: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenegotiationOption {
    pub strategy: String,
    pub approach: String,
    pub target_savings: Decimal,
    pub timeline: String,
    pub success_probability: u8,
    pub negotiation_points: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartWindow {
    #[serde(rename = "Immediate - Start within 24 hours")]
    Immediate,
    #[serde(rename = "High - Start within 3 days")]
    ThreeDays,
    #[serde(rename = "Medium - Start within 1 week")]
    OneWeek,
}

impl fmt::Display for StartWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StartWindow::Immediate => "Immediate - Start within 24 hours",
            StartWindow::ThreeDays => "High - Start within 3 days",
            StartWindow::OneWeek => "Medium - Start within 1 week",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationKind {
    Reallocation,
    SpendingPause,
    VendorRenegotiation,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Reallocation => "reallocation",
            RecommendationKind::SpendingPause => "spending_pause",
            RecommendationKind::VendorRenegotiation => "vendor_renegotiation",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecommendationDetail {
    Reallocation {
        options: Vec<ReallocationOption>,
        recommended_action: String,
        priority: Priority,
    },
    SpendingPause {
        /// Empty for Low severity breaches. Still a valid recommendation.
        options: Vec<PauseOption>,
    },
    VendorRenegotiation {
        options: Vec<RenegotiationOption>,
        negotiation_goal: String,
        start_window: StartWindow,
        escalation_path: Vec<String>,
    },
}

impl RecommendationDetail {
    pub fn kind(&self) -> RecommendationKind {
        match self {
            RecommendationDetail::Reallocation { .. } => RecommendationKind::Reallocation,
            RecommendationDetail::SpendingPause { .. } => RecommendationKind::SpendingPause,
            RecommendationDetail::VendorRenegotiation { .. } => {
                RecommendationKind::VendorRenegotiation
            }
        }
    }

    pub fn option_count(&self) -> usize {
        match self {
            RecommendationDetail::Reallocation { options, .. } => options.len(),
            RecommendationDetail::SpendingPause { options } => options.len(),
            RecommendationDetail::VendorRenegotiation { options, .. } => options.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub breach_id: Uuid,
    pub department: String,
    pub category: String,
    pub required_amount: Decimal,
    pub urgency: Urgency,
    #[serde(flatten)]
    pub detail: RecommendationDetail,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn kind(&self) -> RecommendationKind {
        self.detail.kind()
    }
}

// --- Escalation ---

#[derive(Debug, Clone, Serialize)]
pub struct BusinessImpact {
    pub financial_impact: String,
    pub operational_risk: RiskLevel,
    pub compliance_concern: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub breach_id: Uuid,
    pub department: String,
    pub category: String,
    pub severity: Severity,
    pub urgency: Urgency,
    pub limit: Decimal,
    pub spent: Decimal,
    pub overage: Decimal,
    pub overage_percent: Decimal,
    pub is_recurring: bool,
    pub detected_at: DateTime<Utc>,
    pub subject: String,
    /// Narrative from the text generator, or the deterministic template
    /// when the generator call failed or returned garbage.
    pub narrative: String,
    pub degraded: bool,
    pub business_impact: BusinessImpact,
    pub recommended_actions: Vec<String>,
    pub escalation_required: bool,
    pub stakeholders: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    pub notification_id: Uuid,
    pub status: DeliveryStatus,
    pub detail: String,
    pub sent_at: DateTime<Utc>,
}

/// One line of the executive summary's immediate-action table.
#[derive(Debug, Clone, Serialize)]
pub struct BreachDigest {
    pub department: String,
    pub category: String,
    pub overage: Decimal,
    pub severity: Severity,
    pub requires_immediate_action: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveSummary {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub total_overage: Decimal,
    pub departments_affected: Vec<String>,
    pub critical_breaches: usize,
    pub priority: Priority,
    pub key_findings: Vec<String>,
    pub immediate_actions: Vec<BreachDigest>,
    pub financial_recommendations: Vec<String>,
    pub next_steps: Vec<String>,
    pub timeline: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Department Manager")]
    DepartmentManager,
    #[serde(rename = "Finance Director")]
    FinanceDirector,
    #[serde(rename = "Procurement Team")]
    ProcurementTeam,
    #[serde(rename = "Executive Team")]
    ExecutiveTeam,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::DepartmentManager,
        Role::FinanceDirector,
        Role::ProcurementTeam,
        Role::ExecutiveTeam,
    ];

    pub fn sla_hours(&self) -> i64 {
        match self {
            Role::DepartmentManager => thresholds::SLA_DEPARTMENT_MANAGER_HOURS,
            Role::FinanceDirector => thresholds::SLA_FINANCE_DIRECTOR_HOURS,
            Role::ProcurementTeam => thresholds::SLA_PROCUREMENT_TEAM_HOURS,
            Role::ExecutiveTeam => thresholds::SLA_EXECUTIVE_TEAM_HOURS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::DepartmentManager => "Department Manager",
            Role::FinanceDirector => "Finance Director",
            Role::ProcurementTeam => "Procurement Team",
            Role::ExecutiveTeam => "Executive Team",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionRequest {
    pub id: Uuid,
    pub role: Role,
    pub priority: Priority,
    pub due_by: DateTime<Utc>,
    pub actions: Vec<String>,
    pub deliverables: Vec<String>,
    pub total_overage: Decimal,
    pub departments_affected: usize,
    pub critical_breaches: usize,
    pub escalation_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EscalationReport {
    pub notifications: Vec<Notification>,
    pub receipts: Vec<DeliveryReceipt>,
    pub summary: ExecutiveSummary,
    pub action_requests: Vec<ActionRequest>,
}
