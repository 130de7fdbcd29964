// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Newline-delimited string list store

use super::traits::DataStore;
use super::types::{StoreError, StoreResult};
use crate::catalog::DatasetEntry;
use crate::storage::Data;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct LinesStore;

impl LinesStore {
    pub const TYPE_TAG: &'static str = "str_list";
}

impl DataStore for LinesStore {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    /// Blank lines are skipped and every line is trimmed
    fn load(&self, path: &Path, _entry: &DatasetEntry) -> StoreResult<Data> {
        let text = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        Ok(Data::Lines(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }

    fn dump(&self, path: &Path, data: &Data, _entry: &DatasetEntry) -> StoreResult<()> {
        let lines = data
            .as_lines()
            .ok_or_else(|| StoreError::wrong_kind(Self::TYPE_TAG, data.kind()))?;
        std::fs::write(path, lines.join("\n")).map_err(|e| StoreError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "a\n\n  b  \n").unwrap();

        let entry = DatasetEntry::raw("ids.txt", LinesStore::TYPE_TAG).unwrap();
        let loaded = LinesStore.load(&path, &entry).unwrap();
        assert_eq!(loaded, Data::Lines(vec!["a".into(), "b".into()]));
    }
}
