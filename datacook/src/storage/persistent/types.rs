// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage backend error handling

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by [`DataStore`](super::DataStore) implementations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt data in {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Store '{store}' does not support {operation}")]
    Unsupported { store: String, operation: String },

    #[error("Store '{store}' cannot hold {kind} data")]
    WrongKind { store: String, kind: String },

    #[error("Unknown store type: {0}")]
    UnknownStore(String),
}

impl StoreError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn corrupt(path: &Path, reason: impl ToString) -> Self {
        StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn unsupported(store: &str, operation: &str) -> Self {
        StoreError::Unsupported {
            store: store.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn wrong_kind(store: &str, kind: &str) -> Self {
        StoreError::WrongKind {
            store: store.to_string(),
            kind: kind.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
