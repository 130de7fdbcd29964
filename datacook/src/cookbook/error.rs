// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Recipe execution errors

use thiserror::Error;

/// Error type returned by user procedures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Recipe {recipe} failed: {source}")]
    Failed {
        recipe: String,
        #[source]
        source: BoxError,
    },

    #[error("Recipe {recipe} produced {found} outputs for {expected} dishes")]
    OutputArity {
        recipe: String,
        expected: usize,
        found: usize,
    },

    #[error("Recipe {recipe} got unusable ingredients: {reason}")]
    InvalidIngredients { recipe: String, reason: String },

    #[error("Recipe {0} is an automatic join and must be run by the engine")]
    RequiresPlanner(String),
}

impl RecipeError {
    pub fn failed(recipe: &str, source: impl Into<BoxError>) -> Self {
        RecipeError::Failed {
            recipe: recipe.to_string(),
            source: source.into(),
        }
    }
}

pub type RecipeResult<T> = Result<T, RecipeError>;
