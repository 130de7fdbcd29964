// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CSV store
//!
//! Entry options:
//! - `CSV_DELIMITER`: single-character delimiter (default `,`)
//! - `CSV_HEADER`: whether the file carries a header row (default `true`).
//!   Headerless files take their column names from the declared fields,
//!   minus any listed in `CSV_EXCLUDE`.

use super::traits::DataStore;
use super::types::{StoreError, StoreResult};
use crate::catalog::DatasetEntry;
use crate::storage::{Data, Table, Value};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvStore;

impl CsvStore {
    pub const TYPE_TAG: &'static str = "csv";

    fn delimiter(entry: &DatasetEntry) -> u8 {
        entry
            .option_str("CSV_DELIMITER")
            .and_then(|d| d.bytes().next())
            .unwrap_or(b',')
    }

    fn has_header(entry: &DatasetEntry) -> bool {
        entry.option_bool("CSV_HEADER").unwrap_or(true)
    }

    fn headerless_columns(entry: &DatasetEntry) -> Vec<String> {
        let excluded = entry.option_str_list("CSV_EXCLUDE");
        entry
            .field_names()
            .filter(|f| !excluded.iter().any(|e| e == f))
            .map(str::to_string)
            .collect()
    }
}

impl DataStore for CsvStore {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    fn load(&self, path: &Path, entry: &DatasetEntry) -> StoreResult<Data> {
        let header = Self::has_header(entry);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(Self::delimiter(entry))
            .has_headers(header)
            .flexible(false)
            .from_path(path)
            .map_err(|e| StoreError::corrupt(path, e))?;

        let mut columns: Vec<String> = if header {
            reader
                .headers()
                .map_err(|e| StoreError::corrupt(path, e))?
                .iter()
                .map(str::to_string)
                .collect()
        } else {
            Self::headerless_columns(entry)
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| StoreError::corrupt(path, e))?;
            rows.push(record.iter().map(Value::infer).collect::<Vec<_>>());
        }

        // Headerless files may carry more columns than declared
        if let Some(width) = rows.first().map(Vec::len) {
            while columns.len() < width {
                columns.push(format!("column_{}", columns.len()));
            }
            columns.truncate(width);
        }

        Table::from_rows(columns, rows)
            .map(Data::Table)
            .map_err(|e| StoreError::corrupt(path, e))
    }

    fn dump(&self, path: &Path, data: &Data, entry: &DatasetEntry) -> StoreResult<()> {
        let table = data
            .as_table()
            .ok_or_else(|| StoreError::wrong_kind(Self::TYPE_TAG, data.kind()))?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(Self::delimiter(entry))
            .from_path(path)
            .map_err(|e| StoreError::corrupt(path, e))?;

        if Self::has_header(entry) {
            writer
                .write_record(table.columns())
                .map_err(|e| StoreError::corrupt(path, e))?;
        }
        for row in table.rows() {
            writer
                .write_record(row.iter().map(|v| v.to_string()))
                .map_err(|e| StoreError::corrupt(path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(extra: serde_json::Value) -> DatasetEntry {
        let mut payload = json!({"TYPE": "csv", "FIELDS": [{"id": "int"}, {"name": "str"}]});
        if let (Some(p), Some(e)) = (payload.as_object_mut(), extra.as_object()) {
            p.extend(e.clone());
        }
        DatasetEntry::build("t.csv", payload, &json!({}), &Default::default()).unwrap()
    }

    #[test]
    fn test_round_trip_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let entry = entry(json!({}));
        let table =
            Table::from_rows(["id", "name"], vec![vec![1.into(), "a".into()], vec![2.into(), Value::Null]])
                .unwrap();

        CsvStore.dump(&path, &Data::Table(table.clone()), &entry).unwrap();
        let loaded = CsvStore.load(&path, &entry).unwrap();
        assert_eq!(loaded, Data::Table(table));
    }

    #[test]
    fn test_headerless_uses_declared_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "7;x\n8;y\n").unwrap();

        let entry = entry(json!({"CSV_HEADER": false, "CSV_DELIMITER": ";"}));
        let loaded = CsvStore.load(&path, &entry).unwrap();
        let table = loaded.as_table().unwrap();
        assert_eq!(table.columns(), &["id", "name"]);
        assert_eq!(table.get(1, "name"), Some(&Value::String("y".into())));
    }

    #[test]
    fn test_dump_rejects_non_tables() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvStore
            .dump(&dir.path().join("t.csv"), &Data::Lines(vec![]), &entry(json!({})))
            .unwrap_err();
        assert!(matches!(err, StoreError::WrongKind { .. }));
    }
}
