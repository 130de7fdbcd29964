// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Read-only JSON-lines record stream
//!
//! The first line is a JSON array of column names, every following line a
//! JSON array of cell values. Streams are produced by external writers, so a
//! truncated final line is tolerated and dumping is rejected.

use super::traits::DataStore;
use super::types::{StoreError, StoreResult};
use crate::catalog::DatasetEntry;
use crate::storage::{Data, Table, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLinesStreamStore;

impl JsonLinesStreamStore {
    pub const TYPE_TAG: &'static str = "jsonl_stream";
}

impl DataStore for JsonLinesStreamStore {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    fn load(&self, path: &Path, _entry: &DatasetEntry) -> StoreResult<Data> {
        let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
        let lines: Vec<String> = BufReader::new(file)
            .lines()
            .collect::<Result<_, _>>()
            .map_err(|e| StoreError::io(path, e))?;
        let mut lines = lines.into_iter().filter(|l| !l.trim().is_empty()).peekable();

        let header = lines
            .next()
            .ok_or_else(|| StoreError::corrupt(path, "missing column header line"))?;
        let columns: Vec<String> =
            serde_json::from_str(&header).map_err(|e| StoreError::corrupt(path, e))?;

        let mut table = Table::new(columns);
        while let Some(line) = lines.next() {
            let cells: Vec<serde_json::Value> = match serde_json::from_str(&line) {
                Ok(cells) => cells,
                Err(e) if lines.peek().is_none() => {
                    log::warn!("Ignoring truncated record at end of {}: {}", path.display(), e);
                    break;
                }
                Err(e) => return Err(StoreError::corrupt(path, e)),
            };
            table
                .push_row(cells.iter().map(Value::from_json).collect())
                .map_err(|e| StoreError::corrupt(path, e))?;
        }
        Ok(Data::Table(table))
    }

    fn dump(&self, _path: &Path, _data: &Data, _entry: &DatasetEntry) -> StoreResult<()> {
        Err(StoreError::unsupported(Self::TYPE_TAG, "dump"))
    }

    fn supports_dump(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_records_and_tolerates_truncated_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::write(&path, "[\"id\",\"kind\"]\n[1,\"a\"]\n[2,\"b\"]\n[3,\"c").unwrap();

        let entry = DatasetEntry::raw("events.jsonl", JsonLinesStreamStore::TYPE_TAG).unwrap();
        let data = JsonLinesStreamStore.load(&path, &entry).unwrap();
        let table = data.as_table().unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.get(1, "kind"), Some(&Value::String("b".into())));
    }

    #[test]
    fn test_dump_is_unsupported() {
        let entry = DatasetEntry::raw("events.jsonl", JsonLinesStreamStore::TYPE_TAG).unwrap();
        let err = JsonLinesStreamStore
            .dump(Path::new("events.jsonl"), &Data::Lines(vec![]), &entry)
            .unwrap_err();
        assert!(matches!(err, StoreError::Unsupported { .. }));
        assert!(!JsonLinesStreamStore.supports_dump());
    }
}
