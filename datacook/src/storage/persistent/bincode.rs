// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Binary snapshot store
//!
//! Holds any [`Data`] payload. JSON documents are stored as their text since
//! bincode cannot decode self-describing values.

use super::traits::DataStore;
use super::types::{StoreError, StoreResult};
use crate::catalog::DatasetEntry;
use crate::storage::{Data, Table};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Serialize, Deserialize)]
enum Snapshot {
    Table(Table),
    JsonText(String),
    Lines(Vec<String>),
    Collection(Vec<Snapshot>),
}

impl Snapshot {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Table(t) => Snapshot::Table(t.clone()),
            Data::Json(v) => Snapshot::JsonText(v.to_string()),
            Data::Lines(l) => Snapshot::Lines(l.clone()),
            Data::Collection(items) => {
                Snapshot::Collection(items.iter().map(Snapshot::from_data).collect())
            }
        }
    }

    fn into_data(self) -> Result<Data, serde_json::Error> {
        Ok(match self {
            Snapshot::Table(t) => Data::Table(t),
            Snapshot::JsonText(text) => Data::Json(serde_json::from_str(&text)?),
            Snapshot::Lines(l) => Data::Lines(l),
            Snapshot::Collection(items) => Data::Collection(
                items
                    .into_iter()
                    .map(Snapshot::into_data)
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeStore;

impl BincodeStore {
    pub const TYPE_TAG: &'static str = "bincode";
}

impl DataStore for BincodeStore {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    fn load(&self, path: &Path, _entry: &DatasetEntry) -> StoreResult<Data> {
        let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
        let snapshot: Snapshot = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| StoreError::corrupt(path, e))?;
        snapshot
            .into_data()
            .map_err(|e| StoreError::corrupt(path, e))
    }

    fn dump(&self, path: &Path, data: &Data, _entry: &DatasetEntry) -> StoreResult<()> {
        let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &Snapshot::from_data(data))
            .map_err(|e| StoreError::corrupt(path, e))?;
        writer.flush().map_err(|e| StoreError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_collection_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.bin");
        let entry = DatasetEntry::raw("snap.bin", BincodeStore::TYPE_TAG).unwrap();
        let data = Data::Collection(vec![
            Data::Json(json!({"k": [1, 2]})),
            Data::Table(Table::from_rows(["a"], vec![vec![1.5.into()]]).unwrap()),
        ]);

        BincodeStore.dump(&path, &data, &entry).unwrap();
        assert_eq!(BincodeStore.load(&path, &entry).unwrap(), data);
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.bin");
        std::fs::write(&path, b"\xff\xff\xff\xff\xff").unwrap();
        let entry = DatasetEntry::raw("snap.bin", BincodeStore::TYPE_TAG).unwrap();
        assert!(matches!(
            BincodeStore.load(&path, &entry),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
