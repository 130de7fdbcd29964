// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Loaded dataset payloads

use super::table::Table;
use serde::{Deserialize, Serialize};

/// A dataset as held in memory
///
/// Schema enforcement only applies to [`Data::Table`]; the other variants
/// pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Data {
    Table(Table),
    Json(serde_json::Value),
    Lines(Vec<String>),
    /// Result of a multi-match read, one element per concrete path
    Collection(Vec<Data>),
}

impl Data {
    pub fn kind(&self) -> &'static str {
        match self {
            Data::Table(_) => "table",
            Data::Json(_) => "json",
            Data::Lines(_) => "lines",
            Data::Collection(_) => "collection",
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Data::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Data::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Data::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Data::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_lines(&self) -> Option<&[String]> {
        match self {
            Data::Lines(lines) => Some(lines),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Data]> {
        match self {
            Data::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Tables contained in this payload: itself, or every table of a collection
    pub fn tables(&self) -> Vec<&Table> {
        match self {
            Data::Table(t) => vec![t],
            Data::Collection(items) => items.iter().flat_map(Data::tables).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Table> for Data {
    fn from(table: Table) -> Self {
        Data::Table(table)
    }
}

impl From<serde_json::Value> for Data {
    fn from(value: serde_json::Value) -> Self {
        Data::Json(value)
    }
}

impl From<Vec<String>> for Data {
    fn from(lines: Vec<String>) -> Self {
        Data::Lines(lines)
    }
}
