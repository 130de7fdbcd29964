// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command handlers

use super::commands::{OutputFormat, SourceArgs};
use super::output::TableFormatter;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table as TextTable};
use datacook::{Bindings, ClearTmp, Data, DataSource, JoinKind, JoinTarget, Table};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the data source described by the command line
///
/// Startup never clears `tmp/` unless asked to, since most commands only
/// inspect the data root.
pub fn open_source(args: &SourceArgs) -> Result<DataSource, Box<dyn std::error::Error>> {
    if !args.root.is_dir() {
        return Err(format!("Data root not found at {:?}", args.root).into());
    }

    let mut builder = DataSource::builder(&args.root).clear_tmp(if args.clear_tmp {
        ClearTmp::Default
    } else {
        ClearTmp::Off
    });
    for file in &args.config {
        builder = builder.declaration_file(file);
    }
    for (key, value) in &args.vars {
        builder = builder.var(key, value);
    }
    let ds = builder.build()?;
    log::info!("Opened {} with {} entries", args.root.display(), ds.catalog().len());
    Ok(ds)
}

pub fn handle_entries(ds: &DataSource, format: OutputFormat) -> CliResult {
    let mut rows = Table::new(["pattern", "type", "fields", "flags"]);
    for entry in ds.catalog().entries() {
        let fields: Vec<String> = entry
            .fields()
            .iter()
            .map(|(name, field_type)| format!("{}:{}", name, field_type))
            .collect();
        let mut flags = Vec::new();
        if entry.is_local_fields_only() {
            flags.push("local");
        }
        if entry.is_free_fields() {
            flags.push("free");
        }
        if entry.is_scratch() {
            flags.push("scratch");
        }
        rows.push_row(vec![
            entry.path().into(),
            entry.type_tag().into(),
            fields.join(", ").into(),
            flags.join(",").into(),
        ])?;
    }
    print!("{}", TableFormatter::format(&rows, format, None));
    Ok(())
}

pub fn handle_resolve(ds: &DataSource, name: &str, vars: &Bindings) -> CliResult {
    let target = ds.resolve(name, vars)?;
    println!("{} {}", "Pattern:".bold(), target.pattern);
    println!("{} {}", "Type:".bold(), target.entry.type_tag());
    println!("{} {}", "Path:".bold(), target.concrete);

    if target.is_concrete() {
        let exists = ds.exists(name, vars)?;
        println!("{} {}", "Location:".bold(), ds.real_path(&target.concrete).display());
        println!(
            "{} {}",
            "Exists:".bold(),
            if exists { "yes".green() } else { "no".yellow() }
        );
        return Ok(());
    }

    println!("{} {}", "Unbound slots:".bold(), target.unbound.join(", "));
    let matches = ds.matching_paths(&target)?;
    if matches.is_empty() {
        println!("{}", "No existing matches".yellow());
    }
    for path in matches {
        println!("  {}", path);
    }
    Ok(())
}

pub fn handle_fields(ds: &DataSource, name: &str) -> CliResult {
    let schema = ds.field_schema(name)?;
    if schema.is_empty() {
        println!("{}", "No declared fields".yellow());
        return Ok(());
    }

    let mut text = TextTable::new();
    text.load_preset(UTF8_FULL);
    text.set_header(vec![
        Cell::new("field").fg(Color::Green),
        Cell::new("type").fg(Color::Green),
    ]);
    for (field, field_type) in schema {
        text.add_row(vec![field.clone(), field_type.to_string()]);
    }
    println!("{}", text);
    Ok(())
}

pub fn handle_related(ds: &DataSource, name: &str) -> CliResult {
    let lines = ds.show_related_data(name)?;
    if lines.is_empty() {
        println!("{}", "No related datasets".yellow());
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

pub fn handle_plan(ds: &DataSource, name: Option<String>, fields: Vec<String>) -> CliResult {
    let target = match name {
        Some(name) => JoinTarget::dataset(name),
        None => JoinTarget::fields(fields),
    };
    let plan = ds.autogen_scheme(&target, &[])?;

    let Some(base) = &plan.base else {
        println!("{}", "No dataset provides any requested field".yellow());
        return Ok(());
    };
    println!("{} {} {:?}", "Base:".bold().green(), base.source, base.columns);
    for step in &plan.steps {
        println!(
            "{} {} on {:?} {:?}",
            "Join:".bold(),
            step.source,
            step.key,
            step.columns
        );
    }
    if !plan.unresolved.is_empty() {
        println!("{} {:?}", "Unresolved:".bold().yellow(), plan.unresolved);
    }
    Ok(())
}

pub fn handle_show(
    ds: &DataSource,
    name: &str,
    vars: &Bindings,
    format: OutputFormat,
    limit: Option<usize>,
) -> CliResult {
    match ds.load_existing(name, vars)? {
        Data::Table(table) => print!("{}", TableFormatter::format(&table, format, limit)),
        collection @ Data::Collection(_) => {
            let stacked = Table::concat(collection.tables());
            print!("{}", TableFormatter::format(&stacked, format, limit))
        }
        Data::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Data::Lines(lines) => {
            for line in lines.iter().take(limit.unwrap_or(usize::MAX)) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

pub fn handle_view(
    ds: &DataSource,
    fields: Vec<String>,
    how: JoinKind,
    format: OutputFormat,
    limit: Option<usize>,
) -> CliResult {
    let (table, unresolved) = ds.autogen(&JoinTarget::fields(fields), how, &[])?;
    print!("{}", TableFormatter::format(&table, format, limit));
    if !unresolved.is_empty() {
        eprintln!("{}", format!("Fields not found: {:?}", unresolved).yellow());
    }
    Ok(())
}

pub fn handle_delete(ds: &DataSource, names: &[String], vars: &Bindings) -> CliResult {
    for name in names {
        ds.delete(name, vars)?;
        println!("{} {}", "Deleted".green(), name);
    }
    Ok(())
}
