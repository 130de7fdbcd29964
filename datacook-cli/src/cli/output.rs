// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dataset formatting for CLI output

use super::commands::OutputFormat;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table as TextTable};
use datacook::{Table, Value};

/// Formatter for tables in the supported output formats
pub struct TableFormatter;

impl TableFormatter {
    /// Format at most `limit` rows of `table`
    pub fn format(table: &Table, format: OutputFormat, limit: Option<usize>) -> String {
        let shown = limit.unwrap_or(usize::MAX).min(table.num_rows());
        match format {
            OutputFormat::Table => Self::format_table(table, shown),
            OutputFormat::Json => Self::format_json(table, shown),
            OutputFormat::Csv => Self::format_csv(table, shown),
        }
    }

    fn format_table(table: &Table, shown: usize) -> String {
        if table.is_empty() {
            return format!("{}\n", "No rows".yellow());
        }

        let mut text = TextTable::new();
        text.load_preset(UTF8_FULL);
        text.set_header(
            table
                .columns()
                .iter()
                .map(|col| Cell::new(col).fg(Color::Green))
                .collect::<Vec<_>>(),
        );
        for row in table.rows().iter().take(shown) {
            text.add_row(row.iter().map(Self::value_to_string).collect::<Vec<_>>());
        }

        let mut output = text.to_string();
        output.push('\n');
        if shown < table.num_rows() {
            output.push_str(&format!(
                "{}\n",
                format!("... {} of {} rows shown", shown, table.num_rows()).dimmed()
            ));
        } else {
            output.push_str(&format!("Rows: {}\n", table.num_rows()));
        }
        output
    }

    fn format_json(table: &Table, shown: usize) -> String {
        let rows: Vec<serde_json::Value> = table
            .rows()
            .iter()
            .take(shown)
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = table
                    .columns()
                    .iter()
                    .cloned()
                    .zip(row.iter().map(Value::to_json))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        let document = serde_json::json!({
            "columns": table.columns(),
            "rows": rows,
            "total_rows": table.num_rows(),
        });
        serde_json::to_string_pretty(&document)
            .unwrap_or_else(|_| "{\"error\": \"Could not serialize rows to JSON\"}".to_string())
    }

    fn format_csv(table: &Table, shown: usize) -> String {
        let mut output = table.columns().join(",");
        output.push('\n');
        for row in table.rows().iter().take(shown) {
            let cells: Vec<String> = row.iter().map(Self::value_to_csv_string).collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }
        output
    }

    fn value_to_string(value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            other => other.to_string(),
        }
    }

    fn value_to_csv_string(value: &Value) -> String {
        let text = value.to_string();
        if text.contains(',') || text.contains('"') || text.contains('\n') {
            format!("\"{}\"", text.replace('"', "\"\""))
        } else {
            text
        }
    }
}
