// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dataset payloads and storage backends
//!
//! This module provides:
//! - Cell values and a row-oriented table for tabular datasets
//! - The `Data` payload enum the engine moves between stores and recipes
//! - Pluggable storage backends selected by type tag

pub mod data;
pub mod persistent;
pub mod table;
pub mod value;

pub use data::Data;
pub use persistent::{
    BincodeStore, CsvStore, DataStore, JsonLinesStreamStore, JsonStore, LinesStore, MemoryStore,
    StoreError, StoreRegistry, StoreResult,
};
pub use table::{JoinKind, RowRef, Table, TableError, TableResult};
pub use value::Value;
