// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dataset entries
//!
//! A dataset entry is the catalog record for one (possibly parameterized)
//! data location: its path pattern, storage type, ordered field schema and
//! configuration flags.

use super::declaration::deep_merge;
use super::error::{CatalogError, CatalogResult};
use crate::pattern::PathPattern;
use crate::types::FieldType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered field name → type map; order is the on-disk column order
pub type FieldSchema = IndexMap<String, FieldType>;

/// Typed configuration of a dataset entry
///
/// Keys the engine does not interpret are kept in `extra` for backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Storage type tag
    #[serde(rename = "TYPE")]
    pub type_tag: String,

    /// Fields are not offered to the join planner
    #[serde(rename = "LOCAL_FIELDS_ONLY", default)]
    pub local_fields_only: bool,

    /// Suppress undeclared-field warnings
    #[serde(rename = "DECLARE_NEW_FIELDS", default)]
    pub declare_new_fields: bool,

    /// Skip schema enforcement on load and dump
    #[serde(rename = "FREE_FIELDS", default)]
    pub free_fields: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Catalog record for one dataset path pattern
#[derive(Debug, Clone)]
pub struct DatasetEntry {
    pattern: PathPattern,
    config: DatasetConfig,
    fields: FieldSchema,
}

impl DatasetEntry {
    /// Build an entry from its declaration
    ///
    /// The payload is deep-merged over `defaults`. Each `FIELDS` item is either
    /// a bare field name, typed from `declared` (or opaque when unknown), or a
    /// `{name: type}` map. Bare names with no known type are logged as
    /// undeclared unless the entry sets `LOCAL_FIELDS_ONLY` or
    /// `DECLARE_NEW_FIELDS`.
    ///
    /// # Errors
    /// * `CatalogError::InvalidDeclaration` for malformed fields or config
    /// * `CatalogError::Pattern` if `path` is not a valid pattern
    pub fn build(
        path: &str,
        payload: serde_json::Value,
        defaults: &serde_json::Value,
        declared: &FieldSchema,
    ) -> CatalogResult<Self> {
        let pattern = PathPattern::compile(path)?;

        let mut merged = defaults.clone();
        deep_merge(&mut merged, payload);
        let serde_json::Value::Object(mut object) = merged else {
            return Err(CatalogError::invalid(path, "declaration must be a mapping"));
        };

        let raw_fields = object.remove("FIELDS").unwrap_or(serde_json::Value::Null);
        let config: DatasetConfig = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| CatalogError::invalid(path, e))?;

        let mut fields = FieldSchema::new();
        let mut undeclared = Vec::new();
        let items = match raw_fields {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Null => Vec::new(),
            _ => return Err(CatalogError::invalid(path, "FIELDS must be a list")),
        };
        for item in items {
            match item {
                serde_json::Value::String(name) => {
                    let field_type = match declared.get(&name) {
                        Some(t) => t.clone(),
                        None => {
                            undeclared.push(name.clone());
                            FieldType::Opaque
                        }
                    };
                    insert_field(&mut fields, path, name, field_type);
                }
                serde_json::Value::Object(typed) => {
                    for (name, type_name) in typed {
                        let type_name = type_name.as_str().ok_or_else(|| {
                            CatalogError::invalid(path, format!("type of field '{}' must be a string", name))
                        })?;
                        let field_type = type_name.parse().unwrap_or(FieldType::Opaque);
                        insert_field(&mut fields, path, name, field_type);
                    }
                }
                other => {
                    return Err(CatalogError::invalid(
                        path,
                        format!("unsupported FIELDS item: {}", other),
                    ))
                }
            }
        }

        if !config.local_fields_only && !config.declare_new_fields {
            for field in &undeclared {
                log::warn!("Undeclared field type \"{}\" in {}", field, path);
            }
        }

        Ok(Self {
            pattern,
            config,
            fields,
        })
    }

    /// Ad-hoc entry for a path outside the catalog; schema is not enforced
    pub fn raw(path: &str, type_tag: &str) -> CatalogResult<Self> {
        Ok(Self {
            pattern: PathPattern::compile(path)?,
            config: DatasetConfig {
                type_tag: type_tag.to_string(),
                local_fields_only: true,
                declare_new_fields: true,
                free_fields: true,
                extra: serde_json::Map::new(),
            },
            fields: FieldSchema::new(),
        })
    }

    /// Declared path pattern
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn type_tag(&self) -> &str {
        &self.config.type_tag
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn fields(&self) -> &FieldSchema {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_free_fields(&self) -> bool {
        self.config.free_fields
    }

    pub fn is_local_fields_only(&self) -> bool {
        self.config.local_fields_only
    }

    /// Scratch datasets live under `tmp/` and never take part in field search
    pub fn is_scratch(&self) -> bool {
        let path = self.path();
        path == "tmp" || path.starts_with("tmp/")
    }

    /// The requested fields this entry provides, in request order
    ///
    /// Local-only and scratch entries provide nothing.
    pub fn has_fields<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        if self.is_local_fields_only() || self.is_scratch() {
            return Vec::new();
        }
        let mut found: Vec<String> = Vec::new();
        for field in requested {
            let field = field.as_ref();
            if self.fields.contains_key(field) && !found.iter().any(|f| f == field) {
                found.push(field.to_string());
            }
        }
        found
    }

    /// Backend-specific option
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.config.extra.get(key)
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.option(key).and_then(serde_json::Value::as_str)
    }

    pub fn option_bool(&self, key: &str) -> Option<bool> {
        self.option(key).and_then(serde_json::Value::as_bool)
    }

    pub fn option_str_list(&self, key: &str) -> Vec<String> {
        match self.option(key) {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(serde_json::Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

/// The first declaration of a field name wins; repeats are reported and skipped
fn insert_field(fields: &mut FieldSchema, path: &str, name: String, field_type: FieldType) {
    if fields.contains_key(&name) {
        log::warn!("Duplicate field \"{}\" in {}; keeping the first declaration", name, path);
        return;
    }
    fields.insert(name, field_type);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declared() -> FieldSchema {
        let mut fields = FieldSchema::new();
        fields.insert("id".into(), FieldType::Integer);
        fields
    }

    #[test]
    fn test_duplicate_field_keeps_first_declaration() {
        let entry = DatasetEntry::build(
            "users.csv",
            json!({"FIELDS": ["id", {"id": "str"}, {"name": "str"}, {"name": "int"}]}),
            &json!({"TYPE": "csv"}),
            &declared(),
        )
        .unwrap();

        let names: Vec<_> = entry.field_names().collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(entry.fields()["id"], FieldType::Integer);
        assert_eq!(entry.fields()["name"], FieldType::String);
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let entry = DatasetEntry::build(
            "users.csv",
            json!({"FIELDS": ["id", {"name": "str"}, {"score": "float"}]}),
            &json!({"TYPE": "csv"}),
            &declared(),
        )
        .unwrap();

        let names: Vec<_> = entry.field_names().collect();
        assert_eq!(names, vec!["id", "name", "score"]);
        assert_eq!(entry.fields()["id"], FieldType::Integer);
        assert_eq!(entry.fields()["score"], FieldType::Float);
        assert_eq!(entry.type_tag(), "csv");
    }

    #[test]
    fn test_defaults_are_deep_merged() {
        let defaults = json!({"TYPE": "csv", "CSV": {"sep": ",", "quote": "\""}});
        let entry = DatasetEntry::build(
            "x.csv",
            json!({"FIELDS": [], "CSV": {"sep": ";"}, "FREE_FIELDS": true}),
            &defaults,
            &FieldSchema::new(),
        )
        .unwrap();

        assert!(entry.is_free_fields());
        assert_eq!(entry.option("CSV"), Some(&json!({"sep": ";", "quote": "\""})));
    }

    #[test]
    fn test_unknown_bare_field_is_opaque() {
        let entry = DatasetEntry::build(
            "x.csv",
            json!({"TYPE": "csv", "FIELDS": ["mystery"], "DECLARE_NEW_FIELDS": true}),
            &json!({}),
            &FieldSchema::new(),
        )
        .unwrap();
        assert_eq!(entry.fields()["mystery"], FieldType::Opaque);
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let err = DatasetEntry::build("x.csv", json!({"FIELDS": []}), &json!({}), &FieldSchema::new())
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDeclaration { .. }));
    }

    #[test]
    fn test_local_and_scratch_entries_hide_fields() {
        let local = DatasetEntry::build(
            "x.csv",
            json!({"TYPE": "csv", "FIELDS": ["id"], "LOCAL_FIELDS_ONLY": true}),
            &json!({}),
            &declared(),
        )
        .unwrap();
        assert!(local.has_fields(&["id"]).is_empty());

        let scratch = DatasetEntry::build(
            "tmp/x.csv",
            json!({"TYPE": "csv", "FIELDS": ["id"]}),
            &json!({}),
            &declared(),
        )
        .unwrap();
        assert!(scratch.has_fields(&["id"]).is_empty());
    }
}
