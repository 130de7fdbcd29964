// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the dataset catalog

use crate::pattern::PatternError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Dataset entry not found: {0}")]
    EntryNotFound(String),

    #[error("Invalid declaration for '{target}': {reason}")]
    InvalidDeclaration { target: String, reason: String },

    #[error("Invalid path pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Deserialization error in {}: {reason}", .path.display())]
    DeserializationError { path: PathBuf, reason: String },

    #[error("Include cycle: {0}")]
    IncludeCycle(String),
}

impl CatalogError {
    pub fn invalid(target: impl Into<String>, reason: impl ToString) -> Self {
        CatalogError::InvalidDeclaration {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
