// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage backend trait
//!
//! Every dataset entry names a type tag; the engine looks the tag up in the
//! [`StoreRegistry`](super::StoreRegistry) and talks to the backend only
//! through this capability contract.

use super::types::{StoreError, StoreResult};
use crate::catalog::DatasetEntry;
use crate::pattern::GlobMatcher;
use crate::storage::Data;
use std::path::{Path, PathBuf};

/// Capability contract for one storage format
pub trait DataStore: Send + Sync {
    /// Tag that dataset entries use to select this store (`TYPE`)
    fn type_tag(&self) -> &str;

    /// Whether a dataset exists at `path`
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Read the dataset at `path`
    ///
    /// # Errors
    /// * `StoreError::Io` / `StoreError::Corrupt` on unreadable or malformed data
    fn load(&self, path: &Path, entry: &DatasetEntry) -> StoreResult<Data>;

    /// Write `data` to `path`; parent directories already exist
    ///
    /// # Errors
    /// * `StoreError::Unsupported` for read-only stores
    /// * `StoreError::WrongKind` if the payload kind cannot be represented
    fn dump(&self, path: &Path, data: &Data, entry: &DatasetEntry) -> StoreResult<()>;

    /// Remove the dataset at `path`; absent paths are a no-op
    fn delete(&self, path: &Path) -> StoreResult<()> {
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| StoreError::io(path, e))?;
        }
        Ok(())
    }

    /// Read-only stores return `false`
    fn supports_dump(&self) -> bool {
        true
    }

    /// Datasets this store holds outside the filesystem that match `glob`
    ///
    /// Filesystem-backed stores are listed by the engine directly and keep
    /// the default empty result.
    fn list_matching(&self, _root: &Path, _glob: &GlobMatcher) -> Vec<PathBuf> {
        Vec::new()
    }
}
