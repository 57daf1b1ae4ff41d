// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::boundary::{
    ConsoleTransport, HttpTextGenerator, NotificationTransport, TemplateGenerator, TextGenerator,
    WebhookTransport,
};
use crate::escalation::EscalationCoordinator;
use crate::models::EscalationReport;
use crate::recommender::RecommendationEngine;
use crate::utils::{fmt_money, get_setting, maybe_print_json, pretty_table};
use crate::db;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let breaches = db::latest_breach_run(conn)?;

    let mut engine = RecommendationEngine::new();
    let recommendations = engine.generate(&breaches)?;

    let generator_url = m
        .get_one::<String>("generator-url")
        .cloned()
        .or(get_setting(conn, "generator_url")?);
    let generator: Box<dyn TextGenerator> = match generator_url {
        Some(url) => Box::new(HttpTextGenerator::new(&url)?),
        None => Box::new(TemplateGenerator),
    };

    let transport: Box<dyn NotificationTransport> = if m.get_flag("webhook") {
        let url = get_setting(conn, "webhook_url")?.ok_or_else(|| {
            anyhow::anyhow!("No webhook configured; run `spendguard settings set webhook_url <url>`")
        })?;
        Box::new(WebhookTransport::new(&url)?)
    } else {
        Box::new(ConsoleTransport)
    };

    let mut coordinator = EscalationCoordinator::new();
    let report = coordinator.escalate(&breaches, &recommendations, &*generator, &*transport)?;

    if maybe_print_json(json_flag, false, &report)? {
        return Ok(());
    }
    print_report(&report);
    Ok(())
}

pub fn print_report(report: &EscalationReport) {
    let rows = report
        .notifications
        .iter()
        .map(|n| {
            let receipt = report
                .receipts
                .iter()
                .find(|r| r.notification_id == n.id)
                .map(|r| r.status.to_string())
                .unwrap_or_else(|| "-".to_string());
            vec![
                n.department.clone(),
                n.category.clone(),
                n.urgency.to_string(),
                n.stakeholders.join(", "),
                receipt,
                if n.degraded { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Department", "Category", "Urgency", "Stakeholders", "Delivery", "Degraded"],
            rows,
        )
    );

    println!(
        "Executive summary: {} total overage, {} departments, {} critical breaches, priority {}",
        fmt_money(&report.summary.total_overage),
        report.summary.departments_affected.len(),
        report.summary.critical_breaches,
        report.summary.priority
    );
    for finding in &report.summary.key_findings {
        println!("  - {}", finding);
    }

    let requests = report
        .action_requests
        .iter()
        .map(|a| {
            vec![
                a.role.to_string(),
                a.priority.to_string(),
                a.due_by.format("%Y-%m-%d %H:%M").to_string(),
                a.actions.len().to_string(),
                a.escalation_path.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Role", "Priority", "Due by", "Actions", "Escalates to"],
            requests,
        )
    );
}
