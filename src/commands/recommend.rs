// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::Recommendation;
use crate::recommender::RecommendationEngine;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use crate::db;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let breaches = db::latest_breach_run(conn)?;
    let mut engine = RecommendationEngine::new();
    let recommendations = engine.generate(&breaches)?;

    if maybe_print_json(json_flag, false, &recommendations)? {
        return Ok(());
    }
    print_table(&recommendations);
    Ok(())
}

pub fn print_table(recommendations: &[Recommendation]) {
    let rows = recommendations
        .iter()
        .map(|r| {
            vec![
                r.department.clone(),
                r.category.clone(),
                r.kind().to_string(),
                r.detail.option_count().to_string(),
                fmt_money(&r.required_amount),
                r.urgency.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Department", "Category", "Strategy", "Options", "Required", "Urgency"],
            rows,
        )
    );
}
