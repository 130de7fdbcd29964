// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dataset catalog
//!
//! The catalog owns every dataset entry, the global field registry, the
//! `PARAMS` namespace and any other namespace a declaration introduces. It is
//! built by applying declarations in order and is read-only afterwards.

use super::declaration::{
    deep_merge, Declaration, DeclarationLoader, DATA_NAMESPACE, DEFAULTS_NAMESPACE,
    FIELDS_NAMESPACE, INCLUDE_NAMESPACE, PARAMS_NAMESPACE,
};
use super::entry::{DatasetEntry, FieldSchema};
use super::error::{CatalogError, CatalogResult};
use crate::pattern::Bindings;
use crate::types::FieldType;
use indexmap::IndexMap;
use std::path::Path;

/// Registry of dataset entries keyed by path pattern
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: IndexMap<String, DatasetEntry>,
    fields: FieldSchema,
    defaults: serde_json::Value,
    params: serde_json::Map<String, serde_json::Value>,
    namespaces: IndexMap<String, serde_json::Value>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            fields: FieldSchema::new(),
            defaults: serde_json::Value::Object(serde_json::Map::new()),
            params: serde_json::Map::new(),
            namespaces: IndexMap::new(),
        }
    }

    /// Build a catalog from declarations applied in order
    pub fn from_declarations<I>(declarations: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut catalog = Self::new();
        for declaration in declarations {
            catalog.apply(declaration)?;
        }
        Ok(catalog)
    }

    /// Build a catalog from a declaration file, following `INCLUDE` entries
    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        let declarations = DeclarationLoader::new().load_file(path)?;
        Self::from_declarations(declarations)
    }

    /// Apply one declaration
    ///
    /// `DATA` payloads become dataset entries; every other namespace is
    /// deep-merged into what earlier declarations accumulated.
    ///
    /// # Errors
    /// * `CatalogError::InvalidDeclaration` for malformed payloads or a
    ///   stray `INCLUDE` that was not expanded by the loader
    pub fn apply(&mut self, declaration: Declaration) -> CatalogResult<()> {
        match declaration.namespace.as_str() {
            DATA_NAMESPACE => {
                for (path, payload) in declaration.flatten_data() {
                    let entry = DatasetEntry::build(&path, payload, &self.defaults, &self.fields)?;
                    if !entry.is_local_fields_only() {
                        for (name, field_type) in entry.fields() {
                            self.fields.insert(name.clone(), field_type.clone());
                        }
                    }
                    if self.entries.insert(path.clone(), entry).is_some() {
                        log::debug!("Dataset entry '{}' redeclared", path);
                    }
                }
            }
            DEFAULTS_NAMESPACE => deep_merge(&mut self.defaults, declaration.payload),
            FIELDS_NAMESPACE => {
                let serde_json::Value::Object(fields) = declaration.payload else {
                    return Err(CatalogError::invalid(
                        FIELDS_NAMESPACE,
                        "expected a mapping of field name to type",
                    ));
                };
                for (name, type_name) in fields {
                    let type_name = type_name.as_str().ok_or_else(|| {
                        CatalogError::invalid(name.as_str(), "field type must be a string")
                    })?;
                    let field_type: FieldType = type_name.parse().unwrap_or(FieldType::Opaque);
                    self.fields.insert(name, field_type);
                }
            }
            PARAMS_NAMESPACE => {
                let serde_json::Value::Object(params) = declaration.payload else {
                    return Err(CatalogError::invalid(PARAMS_NAMESPACE, "expected a mapping"));
                };
                let mut merged = serde_json::Value::Object(std::mem::take(&mut self.params));
                deep_merge(&mut merged, serde_json::Value::Object(params));
                if let serde_json::Value::Object(map) = merged {
                    self.params = map;
                }
            }
            INCLUDE_NAMESPACE => {
                return Err(CatalogError::invalid(
                    INCLUDE_NAMESPACE,
                    "includes must be expanded by the declaration loader",
                ))
            }
            other => {
                let slot = self
                    .namespaces
                    .entry(other.to_string())
                    .or_insert(serde_json::Value::Null);
                if slot.is_null() {
                    *slot = declaration.payload;
                } else {
                    deep_merge(slot, declaration.payload);
                }
            }
        }
        Ok(())
    }

    /// First entry, in declaration order, whose pattern fully matches `path`
    pub fn resolve(&self, path: &str) -> Option<(&DatasetEntry, Bindings)> {
        self.entries
            .values()
            .find_map(|entry| entry.pattern().matches(path).map(|b| (entry, b)))
    }

    /// Entry declared under exactly `pattern`
    ///
    /// # Errors
    /// * `CatalogError::EntryNotFound` if no such entry exists
    pub fn entry(&self, pattern: &str) -> CatalogResult<&DatasetEntry> {
        self.entries
            .get(pattern)
            .ok_or_else(|| CatalogError::EntryNotFound(pattern.to_string()))
    }

    pub fn get(&self, pattern: &str) -> Option<&DatasetEntry> {
        self.entries.get(pattern)
    }

    pub fn has(&self, pattern: &str) -> bool {
        self.entries.contains_key(pattern)
    }

    /// Entries providing any of `fields`, ascending by matched-subset size
    ///
    /// Local-only entries, `tmp/` entries and `exclude`d patterns are skipped.
    /// Ties keep declaration order.
    pub fn fields_providing<S, E>(&self, fields: &[S], exclude: &[E]) -> Vec<(String, Vec<String>)>
    where
        S: AsRef<str>,
        E: AsRef<str>,
    {
        let mut found: Vec<(String, Vec<String>)> = self
            .entries
            .iter()
            .filter(|(path, _)| !exclude.iter().any(|e| e.as_ref() == path.as_str()))
            .filter_map(|(path, entry)| {
                let matched = entry.has_fields(fields);
                (!matched.is_empty()).then(|| (path.clone(), matched))
            })
            .collect();
        found.sort_by_key(|(_, matched)| matched.len());
        found
    }

    /// Merged global field registry
    pub fn all_fields(&self) -> &FieldSchema {
        &self.fields
    }

    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    pub fn params(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.params
    }

    pub fn defaults(&self) -> &serde_json::Value {
        &self.defaults
    }

    /// Payload accumulated for a namespace other than the built-in ones
    pub fn namespace(&self, name: &str) -> Option<&serde_json::Value> {
        self.namespaces.get(name)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.namespaces.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = &DatasetEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
