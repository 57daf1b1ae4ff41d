// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget policy extraction from documents: structured JSON, flat CSV, or
//! free-form text scanned with line patterns.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::PipelineError;
use crate::models::{BudgetPolicy, CategoryBudget, Period};

// "IT department budget: $50,000" opens a department section.
static DEPARTMENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(.*?)\s*department.*budget.*[:$]?\s*\$?(\d+(?:,\d+)*)").unwrap()
});

// "Software: $20,000" or "- Software - $20,000" inside a section.
static ITEM_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.*?)[:\-]\s*\$?(\d+(?:,\d+)*)\s*(.*)").unwrap());

pub fn from_json_str(s: &str) -> Result<BudgetPolicy, PipelineError> {
    let policy: BudgetPolicy = serde_json::from_str(s)
        .map_err(|e| PipelineError::Policy(format!("invalid policy JSON: {e}")))?;
    if policy.is_empty() {
        return Err(PipelineError::Policy(
            "policy document contains no categories".into(),
        ));
    }
    Ok(policy)
}

/// Flat CSV with header row `department,category,limit[,period]`.
pub fn from_csv_str(s: &str) -> Result<BudgetPolicy, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(s.as_bytes());
    let mut policy = BudgetPolicy::default();

    for result in rdr.records() {
        let rec = result.map_err(|e| PipelineError::Extraction(format!("bad CSV row: {e}")))?;
        let department = rec
            .get(0)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PipelineError::Extraction("CSV row missing department".into()))?;
        let category = rec
            .get(1)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PipelineError::Extraction("CSV row missing category".into()))?;
        let limit_raw = rec
            .get(2)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PipelineError::Extraction("CSV row missing limit".into()))?;
        let limit = parse_amount(limit_raw)?;
        let period = match rec.get(3).map(str::trim).filter(|v| !v.is_empty()) {
            None => Period::default(),
            Some(p) if p.eq_ignore_ascii_case("monthly") => Period::Monthly,
            Some(p) if p.eq_ignore_ascii_case("annual") => Period::Annual,
            Some(p) => {
                return Err(PipelineError::Extraction(format!(
                    "unknown budget period '{p}'"
                )));
            }
        };
        policy.insert(department, category, CategoryBudget { limit, period });
    }

    if policy.is_empty() {
        return Err(PipelineError::Extraction(
            "no budget rows found in CSV document".into(),
        ));
    }
    Ok(policy)
}

/// Scans free-form text line by line. A department header opens a section;
/// subsequent `name: $amount` lines become that department's categories.
pub fn from_text(s: &str) -> Result<BudgetPolicy, PipelineError> {
    let mut policy = BudgetPolicy::default();
    let mut current_department: Option<String> = None;

    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = DEPARTMENT_LINE.captures(line) {
            let name = caps[1].trim().to_string();
            if !name.is_empty() {
                current_department = Some(name);
                continue;
            }
        }

        if let (Some(dept), Some(caps)) = (&current_department, ITEM_LINE.captures(line)) {
            let category = caps[1].trim().trim_start_matches('-').trim().to_string();
            if category.is_empty() {
                continue;
            }
            let limit = parse_amount(&caps[2])?;
            policy.insert(dept, &category, CategoryBudget {
                limit,
                period: Period::default(),
            });
        }
    }

    if policy.is_empty() {
        return Err(PipelineError::Extraction(
            "no budget rules found in document text".into(),
        ));
    }
    Ok(policy)
}

/// Dispatches on file extension: .json and .csv are parsed structurally,
/// .txt and .md fall back to the text scanner.
pub fn load_document(path: &Path) -> Result<BudgetPolicy, PipelineError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::Extraction(format!("cannot read {}: {e}", path.display())))?;
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("json") => from_json_str(&content),
        Some("csv") => from_csv_str(&content),
        Some("txt") | Some("md") | Some("text") => from_text(&content),
        other => Err(PipelineError::Extraction(format!(
            "unsupported policy document type '{}'",
            other.unwrap_or("none")
        ))),
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, PipelineError> {
    raw.replace(',', "")
        .trim_start_matches('$')
        .parse::<Decimal>()
        .map_err(|_| PipelineError::Extraction(format!("invalid amount '{raw}'")))
}
