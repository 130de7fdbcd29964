// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! JSON document store

use super::traits::DataStore;
use super::types::{StoreError, StoreResult};
use crate::catalog::DatasetEntry;
use crate::storage::Data;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStore;

impl JsonStore {
    pub const TYPE_TAG: &'static str = "json";
}

impl DataStore for JsonStore {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    fn load(&self, path: &Path, _entry: &DatasetEntry) -> StoreResult<Data> {
        let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
        let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| StoreError::corrupt(path, e))?;
        Ok(Data::Json(value))
    }

    fn dump(&self, path: &Path, data: &Data, _entry: &DatasetEntry) -> StoreResult<()> {
        let value = data
            .as_json()
            .ok_or_else(|| StoreError::wrong_kind(Self::TYPE_TAG, data.kind()))?;
        let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, value).map_err(|e| StoreError::corrupt(path, e))?;
        writer.flush().map_err(|e| StoreError::io(path, e))
    }
}
