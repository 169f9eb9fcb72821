// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

const ITEM_HELP: &str = "Line item as comma-separated key=value pairs \
(name, price, unit, qty, gst, transport, tunit, tqty); repeatable";

fn item_arg() -> Arg {
    Arg::new("item")
        .long("item")
        .short('i')
        .action(ArgAction::Append)
        .help(ITEM_HELP)
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    ]
}

fn index_arg() -> Arg {
    Arg::new("index")
        .required(true)
        .value_parser(value_parser!(usize))
        .help("History index as shown by 'history list'")
}

pub fn build_cli() -> Command {
    Command::new("billclip")
        .version(clap::crate_version!())
        .about("Line-item bill calculator with GST, transport and a saved bill history")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Database file (defaults to the platform data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("quote")
                .about("Compute a bill without saving it")
                .arg(item_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("save")
                .about("Compute a bill and save it to history")
                .arg(
                    Arg::new("customer")
                        .long("customer")
                        .short('c')
                        .required(true)
                        .help("Customer name"),
                )
                .arg(item_arg()),
        )
        .subcommand(
            Command::new("history")
                .about("Saved bills")
                .subcommand_required(true)
                .subcommand(
                    Command::new("list")
                        .about("List saved bills")
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .short('s')
                                .help("Case-insensitive customer name filter"),
                        )
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show one bill in detail")
                        .arg(index_arg())
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a bill from history")
                        .arg(index_arg())
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .short('y')
                                .action(ArgAction::SetTrue)
                                .help("Confirm the deletion"),
                        ),
                )
                .subcommand(
                    Command::new("export")
                        .about("Export all bills")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Display settings")
                .subcommand_required(true)
                .subcommand(Command::new("show").args(json_args()))
                .subcommand(
                    Command::new("set-currency").arg(Arg::new("symbol").required(true)),
                )
                .subcommand(Command::new("set-unit").arg(Arg::new("unit").required(true))),
        )
}
