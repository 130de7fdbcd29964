// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use datacook::{Bindings, JoinKind};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "datacook")]
#[command(version, about = "Inspect datacook catalogs and datasets", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options describing the data source to open
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Data root directory
    #[arg(short, long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Declaration file (repeatable); defaults to <root>/conf/datacook.json
    #[arg(short, long, global = true)]
    pub config: Vec<PathBuf>,

    /// Ambient variable used to fill path slots, as key=value (repeatable)
    #[arg(long = "var", value_parser = parse_var, global = true)]
    pub vars: Vec<(String, String)>,

    /// Remove <root>/tmp when opening the data source
    #[arg(long, global = true)]
    pub clear_tmp: bool,
}

impl SourceArgs {
    pub fn bindings(&self) -> Bindings {
        self.vars.iter().cloned().collect()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// List catalog entries
    Entries {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show how a dataset name resolves to a path
    Resolve {
        /// Dataset name or pattern
        name: String,
    },

    /// Show the field schema of a dataset
    Fields {
        name: String,
    },

    /// List datasets sharing fields with a dataset
    Related {
        name: String,
    },

    /// Show the join plan that would assemble a dataset or a field list
    Plan {
        /// Dataset whose fields to assemble
        #[arg(required_unless_present = "fields")]
        name: Option<String>,

        /// Explicit comma-separated field list
        #[arg(long, value_delimiter = ',', conflicts_with = "name")]
        fields: Vec<String>,
    },

    /// Print an existing dataset
    Show {
        name: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Maximum number of rows to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Assemble fields from the datasets declaring them and print the result
    View {
        /// Comma-separated field list
        #[arg(required = true, value_delimiter = ',')]
        fields: Vec<String>,

        /// Join kind (inner, left, right, outer)
        #[arg(long, default_value = "inner")]
        how: JoinKind,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Maximum number of rows to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete datasets
    Delete {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    Table,
    /// JSON
    Json,
    /// Comma-separated values
    Csv,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("day=mon"), Ok(("day".into(), "mon".into())));
        assert_eq!(parse_var("q=a=b"), Ok(("q".into(), "a=b".into())));
        assert!(parse_var("=x").is_err());
        assert!(parse_var("nokey").is_err());
    }

    #[test]
    fn test_parses_view_command() {
        let cli = Cli::parse_from([
            "datacook", "--root", "/data", "--var", "day=mon", "view", "id,name", "--how", "left",
        ]);
        assert_eq!(cli.source.root, PathBuf::from("/data"));
        assert_eq!(cli.source.bindings().get("day").map(String::as_str), Some("mon"));
        match cli.command {
            Commands::View { fields, how, .. } => {
                assert_eq!(fields, vec!["id", "name"]);
                assert_eq!(how, JoinKind::Left);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
