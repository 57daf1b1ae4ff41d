// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, Command};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the result as pretty JSON")
}

fn jsonl_flag() -> Arg {
    Arg::new("jsonl")
        .long("jsonl")
        .action(ArgAction::SetTrue)
        .help("Print the result as one JSON object per line")
}

pub fn build_cli() -> Command {
    Command::new("spendguard")
        .about("Budget tracking, breach detection and escalation for organizational expenses")
        .version(crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the local store"))
        .subcommand(
            Command::new("policy")
                .about("Budget policy management")
                .subcommand(
                    Command::new("load")
                        .about("Load a policy document (.json, .csv, .txt/.md); resets usage state")
                        .arg(Arg::new("path").required(true).help("Policy document path")),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show the loaded policy")
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("reset")
                        .about("Drop the policy and all recorded transactions"),
                ),
        )
        .subcommand(
            Command::new("expenses")
                .about("Expense recording and audit")
                .subcommand(
                    Command::new("record")
                        .about("Record one expense transaction")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("department").long("department").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("vendor").long("vendor"))
                        .arg(Arg::new("description").long("description"))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("YYYY-MM-DD or RFC 3339; defaults to now"),
                        )
                        .arg(
                            Arg::new("correction")
                                .long("correction")
                                .action(ArgAction::SetTrue)
                                .help("Allow a negative amount as a correction"),
                        )
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("import")
                        .about("Bulk-record expenses from a CSV file")
                        .arg(Arg::new("path").required(true).help("Expense CSV path")),
                )
                .subcommand(
                    Command::new("list")
                        .about("List recorded transactions")
                        .arg(Arg::new("department").long("department"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("unmatched")
                                .long("unmatched")
                                .action(ArgAction::SetTrue)
                                .help("Only transactions outside the policy"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .help("Show at most N most recent transactions"),
                        )
                        .arg(json_flag())
                        .arg(jsonl_flag()),
                ),
        )
        .subcommand(
            Command::new("usage")
                .about("Budget usage reporting")
                .subcommand(
                    Command::new("snapshot")
                        .about("Per-category usage with department rollups")
                        .arg(json_flag())
                        .arg(jsonl_flag()),
                )
                .subcommand(
                    Command::new("status")
                        .about("Real-time status with alerts and an overall flag")
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("breaches")
                .about("Breach detection")
                .subcommand(
                    Command::new("detect")
                        .about("Scan usage for categories at or over their limit")
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("history")
                        .about("Full append-only breach log")
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("recommend")
                .about("Generate corrective recommendations for the latest detection run")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("escalate")
                .about("Notify stakeholders and build action requests for the latest detection run")
                .arg(json_flag())
                .arg(
                    Arg::new("webhook")
                        .long("webhook")
                        .action(ArgAction::SetTrue)
                        .help("Deliver via the configured webhook instead of the console"),
                )
                .arg(
                    Arg::new("generator-url")
                        .long("generator-url")
                        .help("Text-generator endpoint; overrides the stored setting"),
                ),
        )
        .subcommand(
            Command::new("pipeline")
                .about("Run the complete flow: load, ingest, detect, recommend, escalate")
                .arg(
                    Arg::new("policy")
                        .long("policy")
                        .help("Policy document; optional when one is already stored"),
                )
                .arg(
                    Arg::new("expenses")
                        .long("expenses")
                        .help("Expense CSV to ingest before detection"),
                )
                .arg(json_flag()),
        )
        .subcommand(Command::new("demo").about("Seed the store with sample policy and expenses"))
        .subcommand(
            Command::new("settings")
                .about("Ambient configuration")
                .subcommand(
                    Command::new("set")
                        .about("Set a configuration value (generator_url, webhook_url)")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                )
                .subcommand(Command::new("show").about("Show stored configuration")),
        )
        .subcommand(Command::new("doctor").about("Check the store for inconsistencies"))
}
