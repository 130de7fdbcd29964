// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory store for testing and scratch datasets

use super::traits::DataStore;
use super::types::{StoreError, StoreResult};
use crate::catalog::DatasetEntry;
use crate::pattern::GlobMatcher;
use crate::storage::Data;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Store that keeps datasets in a process-local map keyed by path
#[derive(Default, Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<PathBuf, Data>>>,
}

impl MemoryStore {
    pub const TYPE_TAG: &'static str = "memory";

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of datasets currently held
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl DataStore for MemoryStore {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    fn exists(&self, path: &Path) -> bool {
        self.data.read().contains_key(path)
    }

    fn load(&self, path: &Path, _entry: &DatasetEntry) -> StoreResult<Data> {
        self.data.read().get(path).cloned().ok_or_else(|| {
            StoreError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not in memory store"),
            )
        })
    }

    fn dump(&self, path: &Path, data: &Data, _entry: &DatasetEntry) -> StoreResult<()> {
        self.data.write().insert(path.to_path_buf(), data.clone());
        Ok(())
    }

    fn delete(&self, path: &Path) -> StoreResult<()> {
        self.data.write().remove(path);
        Ok(())
    }

    fn list_matching(&self, root: &Path, glob: &GlobMatcher) -> Vec<PathBuf> {
        self.data
            .read()
            .keys()
            .filter(|path| {
                path.strip_prefix(root)
                    .map(|rel| glob.is_match(&rel.to_string_lossy()))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Table;

    #[test]
    fn test_round_trip_and_delete() {
        let store = MemoryStore::new();
        let entry = DatasetEntry::raw("mem/a", MemoryStore::TYPE_TAG).unwrap();
        let path = Path::new("/root/mem/a");
        let data = Data::Table(Table::new(["x"]));

        assert!(!store.exists(path));
        store.dump(path, &data, &entry).unwrap();
        assert!(store.exists(path));
        assert_eq!(store.load(path, &entry).unwrap(), data);

        store.delete(path).unwrap();
        assert!(!store.exists(path));
        store.delete(path).unwrap();
    }

    #[test]
    fn test_list_matching_is_relative_to_root() {
        let store = MemoryStore::new();
        let entry = DatasetEntry::raw("mem/a", MemoryStore::TYPE_TAG).unwrap();
        for name in ["a", "b"] {
            let path = PathBuf::from(format!("/root/mem/{}", name));
            store.dump(&path, &Data::Lines(vec![]), &entry).unwrap();
        }
        let glob = GlobMatcher::new("mem/*").unwrap();
        let mut found = store.list_matching(Path::new("/root"), &glob);
        found.sort();
        assert_eq!(found, vec![PathBuf::from("/root/mem/a"), PathBuf::from("/root/mem/b")]);
    }
}
