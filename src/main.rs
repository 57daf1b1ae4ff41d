// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use spendguard::{cli, commands, db};

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable for --json output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("policy", sub)) => commands::policy::handle(&mut conn, sub)?,
        Some(("expenses", sub)) => commands::expenses::handle(&mut conn, sub)?,
        Some(("usage", sub)) => commands::usage::handle(&conn, sub)?,
        Some(("breaches", sub)) => commands::breaches::handle(&mut conn, sub)?,
        Some(("recommend", sub)) => commands::recommend::handle(&conn, sub)?,
        Some(("escalate", sub)) => commands::escalate::handle(&conn, sub)?,
        Some(("pipeline", sub)) => commands::pipeline::handle(&mut conn, sub)?,
        Some(("demo", _)) => commands::demo::handle(&mut conn)?,
        Some(("settings", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
