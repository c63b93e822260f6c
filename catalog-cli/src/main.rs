// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! FlexiMart command-line interface

mod cli;

use clap::Parser;
use colored::Colorize;
use std::process;

use cli::{handlers, Cli, LogLevel};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.verbose);

    if let Err(e) = handlers::handle_command(cli.command, &cli.store, cli.format) {
        eprintln!("{}", format!("Error: {}", e).red());
        process::exit(1);
    }
}

/// `--log-level` wins over `--verbose`; without either, RUST_LOG applies with
/// a default of `warn`
fn init_logging(log_level: Option<LogLevel>, verbose: bool) {
    let level = match (log_level, verbose) {
        (Some(level), _) => Some(level.to_level_filter()),
        (None, true) => Some(log::LevelFilter::Debug),
        (None, false) => None,
    };

    let mut builder = match level {
        Some(level) => {
            let mut builder = env_logger::Builder::new();
            builder.filter_level(level);
            builder
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")),
    };
    builder.format_timestamp(None).init();
}
