// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Path resolution and storage access
//!
//! Turns a requested dataset name into a catalog entry and a concrete path,
//! and implements the read, write and delete paths around the storage
//! backends: cache, hooks and schema enforcement.

use super::error::{EngineError, EngineResult};
use super::generate::Trail;
use super::DataSource;
use crate::catalog::DatasetEntry;
use crate::hooks::apply_chain;
use crate::pattern::{expand_wildcards_to_glob, slot_names, substitute, Bindings, GlobMatcher};
use crate::storage::{Data, DataStore, StoreError, StoreRegistry, Table};
use crate::types::TypeCaster;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// A requested dataset after resolution and substitution
#[derive(Debug, Clone)]
pub struct Target<'a> {
    /// Canonical name: the catalog pattern, or the literal path
    pub pattern: String,
    pub entry: Cow<'a, DatasetEntry>,
    /// Caller bindings merged with the bindings extracted by the catalog
    pub bindings: Bindings,
    /// Path relative to the data root after substitution
    pub concrete: String,
    /// Slots left unbound in `concrete`
    pub unbound: Vec<String>,
}

impl Target<'_> {
    pub fn is_concrete(&self) -> bool {
        self.unbound.is_empty()
    }
}

impl DataSource {
    /// Resolve `name` against the catalog and materialize its path
    ///
    /// A name matching a catalog pattern takes that pattern's entry and its
    /// extracted bindings override `vars`. A name that is itself a declared
    /// pattern is used as is. Anything else is treated as a literal path whose
    /// storage type is guessed from its extension.
    ///
    /// # Errors
    /// * `EngineError::PatternMismatch` if no entry or store fits the name
    pub fn resolve(&self, name: &str, vars: &Bindings) -> EngineResult<Target<'_>> {
        let mut bindings = vars.clone();
        let (pattern, entry) = if let Some((entry, extracted)) = self.catalog.resolve(name) {
            bindings.extend(extracted);
            (entry.path().to_string(), Cow::Borrowed(entry))
        } else if let Some(entry) = self.catalog.get(name) {
            (name.to_string(), Cow::Borrowed(entry))
        } else {
            let tag = StoreRegistry::tag_for_extension(Path::new(name))
                .ok_or_else(|| EngineError::PatternMismatch(name.to_string()))?;
            (name.to_string(), Cow::Owned(DatasetEntry::raw(name, tag)?))
        };

        let concrete = substitute(&pattern, &bindings, &self.config.vars);
        let unbound = slot_names(&concrete);
        log::debug!("Resolved {} as {} -> {}", name, pattern, concrete);
        Ok(Target {
            pattern,
            entry,
            bindings,
            concrete,
            unbound,
        })
    }

    /// Absolute location of a concrete relative path
    pub fn real_path(&self, concrete: &str) -> PathBuf {
        self.config.data_root.join(concrete)
    }

    pub(crate) fn store_for(&self, entry: &DatasetEntry) -> EngineResult<&Arc<dyn DataStore>> {
        self.stores.get(entry.type_tag()).map_err(EngineError::from_store)
    }

    /// Concrete paths matching a target with unbound slots, sorted
    ///
    /// Paths are relative to the data root, `/`-separated.
    pub fn matching_paths(&self, target: &Target<'_>) -> EngineResult<Vec<String>> {
        let glob = GlobMatcher::new(&expand_wildcards_to_glob(&target.concrete))?;
        let root = &self.config.data_root;
        let mut found = BTreeSet::new();

        for entry in WalkDir::new(root).follow_links(true).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(rel) = relative(root, entry.path()) {
                if glob.is_match(&rel) {
                    found.insert(rel);
                }
            }
        }

        let store = self.store_for(&target.entry)?;
        for path in store.list_matching(root, &glob) {
            if let Some(rel) = relative(root, &path) {
                found.insert(rel);
            }
        }
        Ok(found.into_iter().collect())
    }

    /// Whether `name` is present in its backend
    ///
    /// For a name with unbound slots, whether any concrete match exists.
    pub fn exists(&self, name: &str, vars: &Bindings) -> EngineResult<bool> {
        let target = self.resolve(name, vars)?;
        self.target_exists(&target)
    }

    pub(crate) fn target_exists(&self, target: &Target<'_>) -> EngineResult<bool> {
        if !target.is_concrete() {
            return Ok(!self.matching_paths(target)?.is_empty());
        }
        let store = self.store_for(&target.entry)?;
        Ok(store.exists(&self.real_path(&target.concrete)))
    }

    /// Load a dataset, generating it (and anything it depends on) if absent
    ///
    /// A name with unbound slots loads every existing match as a
    /// [`Data::Collection`] and never generates.
    ///
    /// # Errors
    /// * `EngineError::NoRecipeFound` if the dataset is absent and no recipe
    ///   chain can produce it
    /// * `EngineError::DependencyCycle` if every candidate chain loops
    /// * `EngineError::BackendIo` / `EngineError::Schema` on read failures
    pub fn load(&self, name: &str, vars: &Bindings) -> EngineResult<Data> {
        self.load_inner(name, vars, true, &mut Trail::default())
    }

    /// Load a dataset that must already exist
    pub fn load_existing(&self, name: &str, vars: &Bindings) -> EngineResult<Data> {
        self.load_inner(name, vars, false, &mut Trail::default())
    }

    pub(crate) fn load_inner(
        &self,
        name: &str,
        vars: &Bindings,
        generate: bool,
        trail: &mut Trail,
    ) -> EngineResult<Data> {
        let target = self.resolve(name, vars)?;

        if !target.is_concrete() {
            let mut items = Vec::new();
            for path in self.matching_paths(&target)? {
                items.push(self.load_inner(&path, vars, false, trail)?);
            }
            return Ok(Data::Collection(items));
        }

        let real = self.real_path(&target.concrete);
        if let Some(cached) = self.cache.read().get(&real) {
            log::debug!("Cache hit for {}", target.concrete);
            return Ok(cached.clone());
        }

        if !self.target_exists(&target)? {
            if generate {
                return self.generate_inner(name, vars, None, trail);
            }
            return Err(EngineError::BackendIo(StoreError::io(
                &real,
                std::io::Error::new(std::io::ErrorKind::NotFound, "dataset does not exist"),
            )));
        }

        let entry = &target.entry;
        let data = self
            .store_for(entry)?
            .load(&real, entry)
            .map_err(EngineError::from_store)?;
        let data = apply_chain(&self.hooks, |h| h.load_hook(&target.pattern), data).map_err(
            |source| EngineError::Hook {
                dataset: target.pattern.clone(),
                source,
            },
        )?;
        let data = self.enforce_schema(entry, data)?;

        if self.config.cache_in_memory {
            self.cache.write().insert(real, data.clone());
        }
        Ok(data)
    }

    /// Write a dataset and return the schema-enforced value
    ///
    /// Dump hooks only see a copy; the returned value is the one before hooks.
    ///
    /// # Errors
    /// * `EngineError::TargetNotMaterializable` if slots remain unbound
    /// * `EngineError::UnsupportedBackendOperation` for read-only stores
    pub fn dump(&self, name: &str, data: Data, vars: &Bindings) -> EngineResult<Data> {
        let target = self.resolve(name, vars)?;
        if !target.is_concrete() {
            return Err(EngineError::TargetNotMaterializable {
                path: target.concrete,
                slots: target.unbound,
            });
        }

        let entry = &target.entry;
        let store = self.store_for(entry)?;
        if !store.supports_dump() {
            return Err(EngineError::UnsupportedBackendOperation {
                store: store.type_tag().to_string(),
                operation: "dump".to_string(),
            });
        }

        let data = self.enforce_schema(entry, data)?;
        let hooked = apply_chain(&self.hooks, |h| h.dump_hook(&target.pattern), data.clone())
            .map_err(|source| EngineError::Hook {
                dataset: target.pattern.clone(),
                source,
            })?;

        let real = self.real_path(&target.concrete);
        if let Some(parent) = real.parent() {
            fs::create_dir_all(parent)?;
        }
        store
            .dump(&real, &hooked, entry)
            .map_err(EngineError::from_store)?;
        log::debug!("Dumped {}", target.concrete);
        Ok(data)
    }

    /// Remove a dataset; absent datasets are a no-op
    ///
    /// A directory at the dataset's location is removed recursively.
    pub fn delete(&self, name: &str, vars: &Bindings) -> EngineResult<()> {
        let target = self.resolve(name, vars)?;
        if !target.is_concrete() {
            return Err(EngineError::TargetNotMaterializable {
                path: target.concrete,
                slots: target.unbound,
            });
        }

        let real = self.real_path(&target.concrete);
        self.cache.write().remove(&real);

        if real.is_dir() {
            log::info!("Removing directory {}", real.display());
            fs::remove_dir_all(&real)?;
            return Ok(());
        }
        let store = self.store_for(&target.entry)?;
        if store.exists(&real) {
            store.delete(&real).map_err(EngineError::from_store)?;
            log::debug!("Deleted {}", target.concrete);
        }
        Ok(())
    }

    /// Conform a table to the entry's schema: declared columns in declared
    /// order, each cast to its declared type
    ///
    /// Non-tabular payloads and `FREE_FIELDS` entries pass through.
    pub(crate) fn enforce_schema(&self, entry: &DatasetEntry, data: Data) -> EngineResult<Data> {
        if entry.is_free_fields() {
            return Ok(data);
        }
        let table = match data {
            Data::Table(table) => table,
            other => return Ok(other),
        };

        let columns: Vec<&str> = entry.field_names().collect();
        let mut table: Table = table.reindex(&columns);
        for (name, field_type) in entry.fields() {
            if field_type.is_opaque() {
                continue;
            }
            table.map_column(name, |value| {
                TypeCaster::cast(value, field_type, &self.types).map_err(|source| {
                    EngineError::Schema {
                        dataset: entry.path().to_string(),
                        source,
                    }
                })
            })?;
        }
        Ok(Data::Table(table))
    }

    /// Drop every cached dataset
    pub fn clear_memory_cache(&self) {
        self.cache.write().clear();
    }
}

fn relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
