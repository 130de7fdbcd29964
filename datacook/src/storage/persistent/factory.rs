// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Store registry
//!
//! Maps type tags to [`DataStore`] implementations. The engine resolves the
//! `TYPE` of every dataset entry through this registry.

use super::traits::DataStore;
use super::types::{StoreError, StoreResult};
use super::{BincodeStore, CsvStore, JsonLinesStreamStore, JsonStore, LinesStore, MemoryStore};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Type tag → storage backend
#[derive(Clone, Default)]
pub struct StoreRegistry {
    stores: HashMap<String, Arc<dyn DataStore>>,
}

impl StoreRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in store registered
    ///
    /// # Examples
    /// ```ignore
    /// let stores = StoreRegistry::with_defaults();
    /// let csv = stores.get("csv")?;
    /// ```
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MemoryStore::new());
        registry.register(CsvStore);
        registry.register(JsonStore);
        registry.register(LinesStore);
        registry.register(BincodeStore);
        registry.register(JsonLinesStreamStore);
        registry
    }

    /// Register a store under its own type tag, replacing any previous one
    pub fn register<S: DataStore + 'static>(&mut self, store: S) {
        self.register_arc(Arc::new(store));
    }

    pub fn register_arc(&mut self, store: Arc<dyn DataStore>) {
        let tag = store.type_tag().to_string();
        if self.stores.insert(tag.clone(), store).is_some() {
            log::debug!("Replaced store for type '{}'", tag);
        }
    }

    /// Look up the store for a type tag
    ///
    /// # Errors
    /// * `StoreError::UnknownStore` if no store is registered for `tag`
    pub fn get(&self, tag: &str) -> StoreResult<&Arc<dyn DataStore>> {
        self.stores
            .get(tag)
            .ok_or_else(|| StoreError::UnknownStore(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.stores.contains_key(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DataStore>> {
        self.stores.values()
    }

    /// Guess a store for a path that is not a catalog entry, from its extension
    pub fn tag_for_extension(path: &Path) -> Option<&'static str> {
        match path.extension()?.to_str()? {
            "csv" | "tsv" => Some(CsvStore::TYPE_TAG),
            "json" => Some(JsonStore::TYPE_TAG),
            "txt" | "lst" => Some(LinesStore::TYPE_TAG),
            "bin" | "bincode" => Some(BincodeStore::TYPE_TAG),
            "jsonl" => Some(JsonLinesStreamStore::TYPE_TAG),
            _ => None,
        }
    }
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.stores.keys().collect();
        tags.sort();
        f.debug_struct("StoreRegistry").field("stores", &tags).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_registered() {
        let registry = StoreRegistry::with_defaults();
        for tag in ["memory", "csv", "json", "str_list", "bincode", "jsonl_stream"] {
            assert!(registry.contains(tag), "missing store {}", tag);
        }
        assert!(matches!(
            registry.get("parquet"),
            Err(StoreError::UnknownStore(_))
        ));
    }

    #[test]
    fn test_extension_guess() {
        assert_eq!(StoreRegistry::tag_for_extension(Path::new("tmp/x.csv")), Some("csv"));
        assert_eq!(StoreRegistry::tag_for_extension(Path::new("tmp/x")), None);
    }
}
