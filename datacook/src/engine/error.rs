// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Engine error types

use crate::catalog::CatalogError;
use crate::cookbook::{BoxError, RecipeError};
use crate::pattern::PatternError;
use crate::storage::{StoreError, TableError};
use crate::types::TypeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Path is neither a catalog pattern nor usable as a literal dataset
    #[error("No dataset entry or storage type for path '{0}'")]
    PatternMismatch(String),

    /// Report enumerates every recipe known to the engine
    #[error("Cannot find any recipe for {target}\n{}", .recipes.join("\n"))]
    NoRecipeFound { target: String, recipes: Vec<String> },

    #[error("Dependency cycle: {}", .cycle.join(" -> "))]
    DependencyCycle { cycle: Vec<String> },

    #[error("Store '{store}' does not support {operation}")]
    UnsupportedBackendOperation { store: String, operation: String },

    #[error("Cannot materialize '{path}': unbound slots {slots:?}")]
    TargetNotMaterializable { path: String, slots: Vec<String> },

    #[error("Backend error: {0}")]
    BackendIo(#[from] StoreError),

    #[error("Schema error in {dataset}: {source}")]
    Schema {
        dataset: String,
        #[source]
        source: TypeError,
    },

    #[error(transparent)]
    RecipeFailed(#[from] RecipeError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Hook for {dataset} failed: {source}")]
    Hook {
        dataset: String,
        #[source]
        source: BoxError,
    },

    #[error("Fallback producer for {dataset} failed: {source}")]
    Fallback {
        dataset: String,
        #[source]
        source: BoxError,
    },

    #[error("Dataset {dataset} is not a table ({kind})")]
    NotATable { dataset: String, kind: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn from_store(error: StoreError) -> Self {
        match error {
            StoreError::Unsupported { store, operation } => {
                EngineError::UnsupportedBackendOperation { store, operation }
            }
            other => EngineError::BackendIo(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
