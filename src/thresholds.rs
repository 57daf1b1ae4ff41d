// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Every tunable threshold in the pipeline, in one place. Band edges are
//! inclusive on the lower bound.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;

// --- Status bands (usage percent) ---

/// Usage percent at which a category flips from Safe to Approaching.
pub static APPROACHING_PERCENT: Lazy<Decimal> = Lazy::new(|| Decimal::from(80));

/// Usage percent at which a category flips to Exceeded and breaches are raised.
pub static EXCEEDED_PERCENT: Lazy<Decimal> = Lazy::new(|| Decimal::from(100));

// --- Severity label bands (usage percent at detection time) ---

/// Usage percent floor for a Medium severity label.
pub static SEVERITY_MEDIUM_PERCENT: Lazy<Decimal> = Lazy::new(|| Decimal::from(110));

/// Usage percent floor for a High severity label.
pub static SEVERITY_HIGH_PERCENT: Lazy<Decimal> = Lazy::new(|| Decimal::from(125));

/// Usage percent floor for a Critical severity label.
pub static SEVERITY_CRITICAL_PERCENT: Lazy<Decimal> = Lazy::new(|| Decimal::from(150));

// --- Weighted severity score ---

/// Overage percent contributing one point of base score.
pub static BASE_SCORE_DIVISOR: Lazy<Decimal> = Lazy::new(|| Decimal::from(10));

/// Base score is capped here regardless of overage magnitude.
pub static BASE_SCORE_CAP: Lazy<Decimal> = Lazy::new(|| Decimal::from(10));

/// Multiplier growth per prior breach of the same (department, category).
pub static RECURRENCE_WEIGHT: Lazy<Decimal> = Lazy::new(|| Decimal::new(2, 1));

/// Final score floor for a Medium severity tier.
pub static SCORE_MEDIUM: Lazy<Decimal> = Lazy::new(|| Decimal::from(3));

/// Final score floor for a High severity tier.
pub static SCORE_HIGH: Lazy<Decimal> = Lazy::new(|| Decimal::from(5));

/// Final score floor for a Critical severity tier.
pub static SCORE_CRITICAL: Lazy<Decimal> = Lazy::new(|| Decimal::from(8));

// --- Urgency and risk cutoffs (overage percent, exclusive) ---

/// Overage percent above which urgency escalates to High, operational risk
/// to Medium, and the breach becomes a compliance concern.
pub static URGENCY_HIGH_OVERAGE_PERCENT: Lazy<Decimal> = Lazy::new(|| Decimal::from(25));

/// Overage percent above which urgency and operational risk are Critical/High.
pub static URGENCY_CRITICAL_OVERAGE_PERCENT: Lazy<Decimal> = Lazy::new(|| Decimal::from(50));

// --- Reallocation sourcing ---

/// Assumed contingency-fund headroom relative to the overage.
pub static CONTINGENCY_AVAILABLE_RATIO: Lazy<Decimal> = Lazy::new(|| Decimal::new(12, 1));

/// Assumed cross-department surplus relative to the overage.
pub static SURPLUS_AVAILABLE_RATIO: Lazy<Decimal> = Lazy::new(|| Decimal::new(8, 1));

// --- Spending pause ---

/// Purchase size above which an immediate freeze applies.
pub static SPENDING_FREEZE_FLOOR: Lazy<Decimal> = Lazy::new(|| Decimal::from(500));

// --- Vendor renegotiation target savings (fraction of overage) ---

/// Target savings from volume-discount renegotiation.
pub static VOLUME_DISCOUNT_SAVINGS_RATIO: Lazy<Decimal> = Lazy::new(|| Decimal::new(15, 2));

/// Target savings from service scope adjustment.
pub static SCOPE_ADJUSTMENT_SAVINGS_RATIO: Lazy<Decimal> = Lazy::new(|| Decimal::new(25, 2));

/// Target savings from competitive bidding.
pub static COMPETITIVE_BID_SAVINGS_RATIO: Lazy<Decimal> = Lazy::new(|| Decimal::new(30, 2));

/// Success probability estimates (percent) per renegotiation strategy.
pub const VOLUME_DISCOUNT_SUCCESS: u8 = 70;
pub const SCOPE_ADJUSTMENT_SUCCESS: u8 = 85;
pub const COMPETITIVE_BID_SUCCESS: u8 = 60;

// --- Escalation SLAs (hours from action-request creation) ---

pub const SLA_DEPARTMENT_MANAGER_HOURS: i64 = 24;
pub const SLA_FINANCE_DIRECTOR_HOURS: i64 = 48;
pub const SLA_PROCUREMENT_TEAM_HOURS: i64 = 48;
pub const SLA_EXECUTIVE_TEAM_HOURS: i64 = 72;
