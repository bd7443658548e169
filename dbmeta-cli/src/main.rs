// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! dbmeta CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // RUST_LOG can still override this
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "dbmeta".bold().green(), dbmeta::VERSION);
            println!("Database catalog object model");
            Ok(())
        }

        Commands::Schemas { source } => cli::handle_schemas(source),

        Commands::Procedures { source, schema } => cli::handle_procedures(source, schema),

        Commands::Aggregates {
            source,
            schema,
            qualification,
        } => cli::handle_aggregates(source, schema, qualification),

        Commands::Defaults { source, set_schema } => cli::handle_defaults(source, set_schema),
    }
}
