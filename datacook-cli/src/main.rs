// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! datacook CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // -v/--verbose wins over --log-level; RUST_LOG still applies otherwise
    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Commands::Version = cli.command {
        println!("{} {}", "datacook".bold().green(), datacook::VERSION);
        println!("Declarative build engine for derived tabular datasets");
        return Ok(());
    }

    let ds = cli::open_source(&cli.source)?;
    let vars = cli.source.bindings();

    match cli.command {
        Commands::Version => Ok(()),
        Commands::Entries { format } => cli::handle_entries(&ds, format),
        Commands::Resolve { name } => cli::handle_resolve(&ds, &name, &vars),
        Commands::Fields { name } => cli::handle_fields(&ds, &name),
        Commands::Related { name } => cli::handle_related(&ds, &name),
        Commands::Plan { name, fields } => cli::handle_plan(&ds, name, fields),
        Commands::Show {
            name,
            format,
            limit,
        } => cli::handle_show(&ds, &name, &vars, format, limit),
        Commands::View {
            fields,
            how,
            format,
            limit,
        } => cli::handle_view(&ds, fields, how, format, limit),
        Commands::Delete { names } => cli::handle_delete(&ds, &names, &vars),
    }
}
