// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The complete flow in one command: load policy, ingest expenses, then
//! detect, recommend and escalate off the fresh detection run.

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::boundary::{ConsoleTransport, TemplateGenerator};
use crate::detector::BreachDetector;
use crate::escalation::EscalationCoordinator;
use crate::ledger::ExpenseLedger;
use crate::models::{Breach, EscalationReport, Recommendation, Status, StatusReport};
use crate::recommender::RecommendationEngine;
use crate::utils::maybe_print_json;
use crate::{commands, db, policy};

#[derive(Serialize)]
struct PipelineOutcome {
    status: StatusReport,
    breaches: Vec<Breach>,
    recommendations: Vec<Recommendation>,
    escalation: Option<EscalationReport>,
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");

    if let Some(path) = m.get_one::<String>("policy") {
        let parsed = policy::load_document(Path::new(path))?;
        let mut ledger = ExpenseLedger::new();
        ledger.load_policy(parsed)?;
        let loaded = ledger.policy().cloned().unwrap_or_default();
        db::save_policy(conn, &loaded)?;
        if !json_flag {
            println!(
                "Policy loaded: {} categories across {} departments",
                loaded.category_count(),
                loaded.departments.len()
            );
        }
    }

    if let Some(path) = m.get_one::<String>("expenses") {
        let (recorded, unmatched) = commands::expenses::import_csv(conn, path.trim())?;
        if !json_flag {
            println!(
                "Expenses ingested: {} matched, {} unmatched",
                recorded, unmatched
            );
        }
    }

    let ledger = db::load_ledger(conn)?;
    let status = ledger.real_time_status();

    let mut detector = BreachDetector::with_history(db::load_breach_history(conn)?);
    let breaches = detector.analyze(&ledger)?;
    db::insert_breaches(conn, Uuid::new_v4(), &breaches)?;

    let (recommendations, escalation) = if breaches.is_empty() {
        (Vec::new(), None)
    } else {
        let mut engine = RecommendationEngine::new();
        let recommendations = engine.generate(&breaches)?;
        let mut coordinator = EscalationCoordinator::new();
        let report = coordinator.escalate(
            &breaches,
            &recommendations,
            &TemplateGenerator,
            &ConsoleTransport,
        )?;
        (recommendations, Some(report))
    };

    let outcome = PipelineOutcome {
        status,
        breaches,
        recommendations,
        escalation,
    };
    if maybe_print_json(json_flag, false, &outcome)? {
        return Ok(());
    }

    if !outcome.breaches.is_empty() {
        commands::recommend::print_table(&outcome.recommendations);
        if let Some(report) = &outcome.escalation {
            commands::escalate::print_report(report);
        }
    }
    let s = &outcome.status;
    println!(
        "Pipeline complete: overall {} | {} categories ({} exceeded, {} approaching) | \
         {} breaches, {} recommendations, {} notifications",
        s.overall,
        s.summary.categories,
        s.summary.exceeded,
        s.summary.approaching,
        outcome.breaches.len(),
        outcome.recommendations.len(),
        outcome
            .escalation
            .as_ref()
            .map(|e| e.notifications.len())
            .unwrap_or(0)
    );
    if s.overall == Status::Safe {
        println!("All categories within budget");
    }
    Ok(())
}
