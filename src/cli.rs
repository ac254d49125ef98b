// Copyright (c) 2025 Coinkeep Developers.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON instead of a table"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Row id")
}

pub fn build_cli() -> Command {
    Command::new("coinkeep")
        .about("Multi-wallet ledger with transfer consistency, schedules and cash adjustments")
        .version(crate_version!())
        .arg_required_else_help(false)
        .subcommand(Command::new("init").about("Create the database and schema"))
        .subcommand(
            Command::new("profile")
                .about("Manage user profiles")
                .subcommand(
                    Command::new("add").about("Create a profile").arg(
                        Arg::new("name").required(true).help("Profile name"),
                    ),
                )
                .subcommand(json_args(
                    Command::new("list").about("List profiles"),
                ))
                .subcommand(
                    Command::new("use").about("Switch the active profile").arg(
                        Arg::new("name").required(true).help("Profile name"),
                    ),
                ),
        )
        .subcommand(
            Command::new("wallet")
                .about("Manage wallets of the active profile")
                .subcommand(
                    Command::new("add")
                        .about("Create a wallet")
                        .arg(Arg::new("name").required(true).help("Wallet name"))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .required(true)
                                .help("ISO currency code, e.g. EUR"),
                        )
                        .arg(
                            Arg::new("initial")
                                .long("initial")
                                .help("Starting balance (default 0)"),
                        ),
                )
                .subcommand(json_args(Command::new("list").about("List wallets with balances")))
                .subcommand(
                    Command::new("rm").about("Delete a wallet without history").arg(
                        Arg::new("name").required(true).help("Wallet name"),
                    ),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage transaction categories")
                .subcommand(
                    Command::new("add").about("Create a category").arg(
                        Arg::new("name").required(true).help("Category name"),
                    ),
                )
                .subcommand(json_args(Command::new("list").about("List categories")))
                .subcommand(
                    Command::new("rm").about("Delete a category").arg(
                        Arg::new("name").required(true).help("Category name"),
                    ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record an income or expense")
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .help("Positive amount"),
                        )
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .required(true)
                                .help("YYYY-MM-DD"),
                        )
                        .arg(
                            Arg::new("wallet")
                                .long("wallet")
                                .help("Wallet name; omit to leave the transaction unassigned"),
                        )
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .help("Required when no wallet is given"),
                        )
                        .arg(Arg::new("category").long("category").help("Category name"))
                        .arg(Arg::new("desc").long("desc").help("Free-form note")),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of a transaction")
                        .arg(id_arg())
                        .arg(Arg::new("wallet").long("wallet").help("Move to this wallet"))
                        .arg(
                            Arg::new("unassign")
                                .long("unassign")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("wallet")
                                .help("Detach from its wallet"),
                        )
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("desc").long("desc")),
                )
                .subcommand(Command::new("rm").about("Delete a transaction").arg(id_arg()))
                .subcommand(json_args(
                    Command::new("list")
                        .about("List transactions")
                        .arg(Arg::new("wallet").long("wallet").help("Filter by wallet name"))
                        .arg(
                            Arg::new("unassigned")
                                .long("unassigned")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("wallet")
                                .help("Only rows without a wallet"),
                        )
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(u32)),
                        ),
                )),
        )
        .subcommand(
            Command::new("transfer")
                .about("Move money between wallets")
                .subcommand(
                    Command::new("add")
                        .about("Record a transfer")
                        .arg(
                            Arg::new("from")
                                .long("from")
                                .required(true)
                                .help("Source wallet name"),
                        )
                        .arg(
                            Arg::new("to")
                                .long("to")
                                .required(true)
                                .help("Destination wallet name"),
                        )
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .help("Amount in the source wallet's currency"),
                        )
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD (default today)"))
                        .arg(Arg::new("desc").long("desc")),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of a transfer")
                        .arg(id_arg())
                        .arg(Arg::new("from").long("from").help("New source wallet"))
                        .arg(Arg::new("to").long("to").help("New destination wallet"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(
                            Arg::new("converted")
                                .long("converted")
                                .help("Replace the captured destination-currency amount"),
                        )
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD"))
                        .arg(Arg::new("desc").long("desc")),
                )
                .subcommand(Command::new("rm").about("Delete a transfer").arg(id_arg()))
                .subcommand(json_args(
                    Command::new("list")
                        .about("List transfers")
                        .arg(
                            Arg::new("wallet")
                                .long("wallet")
                                .help("Wallet name, matches either leg"),
                        )
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(u32)),
                        ),
                )),
        )
        .subcommand(
            Command::new("scheduled")
                .about("Recurring transfers")
                .subcommand(
                    Command::new("add")
                        .about("Register a recurring transfer")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("frequency")
                                .long("frequency")
                                .required(true)
                                .value_parser(["daily", "weekly", "monthly"]),
                        )
                        .arg(
                            Arg::new("day-of-week")
                                .long("day-of-week")
                                .value_parser(value_parser!(u32))
                                .help("0 = Monday .. 6 = Sunday; required for weekly"),
                        )
                        .arg(
                            Arg::new("day-of-month")
                                .long("day-of-month")
                                .value_parser(value_parser!(u32))
                                .help("1..=31, clamped to short months; required for monthly"),
                        )
                        .arg(
                            Arg::new("occurrences")
                                .long("occurrences")
                                .value_parser(value_parser!(u32))
                                .help("Stop after this many runs; omit to repeat forever"),
                        )
                        .arg(Arg::new("desc").long("desc")),
                )
                .subcommand(json_args(
                    Command::new("list").about("List schedules").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Include paused and exhausted schedules"),
                    ),
                ))
                .subcommand(
                    Command::new("toggle")
                        .about("Pause or resume a schedule")
                        .arg(id_arg()),
                )
                .subcommand(Command::new("rm").about("Delete a schedule").arg(id_arg()))
                .subcommand(
                    Command::new("run")
                        .about("Materialize every schedule that is due")
                        .arg(Arg::new("date").long("date").help("Run as of this date (default today)")),
                ),
        )
        .subcommand(
            Command::new("adjust")
                .about("Align a wallet with a physically counted balance")
                .arg(
                    Arg::new("wallet")
                        .long("wallet")
                        .required(true)
                        .help("Wallet name"),
                )
                .arg(
                    Arg::new("counted")
                        .long("counted")
                        .required(true)
                        .help("The counted balance"),
                )
                .arg(Arg::new("reason").long("reason").help("Note for the audit transaction"))
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD (default today)")),
        )
        .subcommand(
            Command::new("rates")
                .about("Exchange rates used for cross-currency transfers")
                .subcommand(
                    Command::new("set-base")
                        .about("Set the base currency rates triangulate through")
                        .arg(Arg::new("currency").required(true)),
                )
                .subcommand(
                    Command::new("set")
                        .about("Store a rate: 1 base = rate quote")
                        .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("base").long("base").required(true))
                        .arg(Arg::new("quote").long("quote").required(true))
                        .arg(Arg::new("rate").long("rate").required(true)),
                )
                .subcommand(Command::new("list").about("Show the most recent stored rates"))
                .subcommand(
                    Command::new("convert")
                        .about("Convert an amount using stored rates")
                        .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export ledger data")
                .subcommand(
                    Command::new("transactions")
                        .about("Export transactions of the active profile")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .required(true)
                                .help("csv or json"),
                        )
                        .arg(Arg::new("out").long("out").required(true).help("Output file")),
                )
                .subcommand(
                    Command::new("transfers")
                        .about("Export transfers of the active profile")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .required(true)
                                .help("csv or json"),
                        )
                        .arg(Arg::new("out").long("out").required(true).help("Output file")),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Audit cached balances, FX coverage and overdue schedules")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Reconcile wallets whose cache has drifted"),
                ),
        )
}
