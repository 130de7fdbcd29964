// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog declarations
//!
//! A declaration document is a JSON array of single-key objects, each naming a
//! namespace (`DATA`, `DEFAULTS`, `FIELDS`, `PARAMS`, ...) and its payload:
//!
//! ```json
//! [
//!   {"DEFAULTS": {"TYPE": "csv"}},
//!   {"DATA": {"raw": {"users.csv": {"FIELDS": ["id", {"name": "str"}]}}}},
//!   {"INCLUDE": "more.json"}
//! ]
//! ```

use super::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_NAMESPACE: &str = "DATA";
pub const DEFAULTS_NAMESPACE: &str = "DEFAULTS";
pub const FIELDS_NAMESPACE: &str = "FIELDS";
pub const PARAMS_NAMESPACE: &str = "PARAMS";
pub const INCLUDE_NAMESPACE: &str = "INCLUDE";

/// One namespaced configuration payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub namespace: String,
    pub payload: serde_json::Value,
}

impl Declaration {
    pub fn new(namespace: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            namespace: namespace.into(),
            payload,
        }
    }

    /// Split a declaration document into declarations, in document order
    ///
    /// The document is either an array of objects or a single object; every
    /// key of every object becomes one declaration.
    pub fn from_document(document: serde_json::Value) -> CatalogResult<Vec<Declaration>> {
        let items = match document {
            serde_json::Value::Array(items) => items,
            object @ serde_json::Value::Object(_) => vec![object],
            other => {
                return Err(CatalogError::invalid(
                    "<document>",
                    format!("expected a list of declarations, found {}", other),
                ))
            }
        };

        let mut declarations = Vec::new();
        for item in items {
            let serde_json::Value::Object(object) = item else {
                return Err(CatalogError::invalid(
                    "<document>",
                    "each declaration must be an object",
                ));
            };
            for (namespace, payload) in object {
                declarations.push(Declaration::new(namespace, payload));
            }
        }
        Ok(declarations)
    }

    /// Flatten a `DATA` payload into `(path, entry payload)` leaves
    ///
    /// A nested object containing `FIELDS` is a leaf; keys on the way down are
    /// joined with `/`.
    pub fn flatten_data(&self) -> Vec<(String, serde_json::Value)> {
        let mut leaves = Vec::new();
        collect_leaves(&self.payload, String::new(), &mut leaves);
        leaves
    }
}

fn collect_leaves(
    node: &serde_json::Value,
    prefix: String,
    leaves: &mut Vec<(String, serde_json::Value)>,
) {
    let serde_json::Value::Object(object) = node else {
        return;
    };
    if object.contains_key("FIELDS") && !prefix.is_empty() {
        leaves.push((prefix, node.clone()));
        return;
    }
    for (key, child) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}/{}", prefix, key)
        };
        collect_leaves(child, path, leaves);
    }
}

/// Recursively merge `patch` into `base`
///
/// Objects are merged key by key; any other value in `patch` replaces the
/// one in `base`.
pub fn deep_merge(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Reads declaration files, expanding `INCLUDE` entries relative to the
/// including file
#[derive(Debug, Default)]
pub struct DeclarationLoader {
    stack: Vec<PathBuf>,
}

impl DeclarationLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a declaration file and everything it includes, in order
    ///
    /// # Errors
    /// * `CatalogError::Io` if a file cannot be read
    /// * `CatalogError::DeserializationError` if a file is not valid JSON
    /// * `CatalogError::IncludeCycle` if a file includes itself transitively
    pub fn load_file(&mut self, path: &Path) -> CatalogResult<Vec<Declaration>> {
        let canonical = fs::canonicalize(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if self.stack.contains(&canonical) {
            let chain: Vec<String> = self
                .stack
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect();
            return Err(CatalogError::IncludeCycle(chain.join(" -> ")));
        }

        log::debug!("Loading declarations from {}", canonical.display());
        let text = fs::read_to_string(&canonical).map_err(|source| CatalogError::Io {
            path: canonical.clone(),
            source,
        })?;
        let document: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| CatalogError::DeserializationError {
                path: canonical.clone(),
                reason: e.to_string(),
            })?;

        let base_dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.stack.push(canonical);
        let result = self.expand(Declaration::from_document(document), &base_dir);
        self.stack.pop();
        result
    }

    fn expand(
        &mut self,
        declarations: CatalogResult<Vec<Declaration>>,
        base_dir: &Path,
    ) -> CatalogResult<Vec<Declaration>> {
        let mut expanded = Vec::new();
        for declaration in declarations? {
            if declaration.namespace != INCLUDE_NAMESPACE {
                expanded.push(declaration);
                continue;
            }
            let includes = match &declaration.payload {
                serde_json::Value::String(path) => vec![path.clone()],
                serde_json::Value::Array(paths) => paths
                    .iter()
                    .map(|p| {
                        p.as_str().map(str::to_string).ok_or_else(|| {
                            CatalogError::invalid(INCLUDE_NAMESPACE, "include paths must be strings")
                        })
                    })
                    .collect::<CatalogResult<Vec<_>>>()?,
                _ => {
                    return Err(CatalogError::invalid(
                        INCLUDE_NAMESPACE,
                        "expected a path or a list of paths",
                    ))
                }
            };
            for include in includes {
                expanded.extend(self.load_file(&base_dir.join(include))?);
            }
        }
        Ok(expanded)
    }
}
