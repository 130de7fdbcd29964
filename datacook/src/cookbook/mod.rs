// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Recipes, cookbooks and the recipe graph
//!
//! Recipes declare which datasets (ingredients) they consume and which
//! datasets (dishes) they produce. Cookbooks group them and keep a menu from
//! dish to candidate recipes; the recipe graph composes cookbooks into the
//! search space for generation.

pub mod book;
pub mod error;
pub mod graph;
pub mod recipe;

pub use book::CookBook;
pub use error::{BoxError, RecipeError, RecipeResult};
pub use graph::{DependencyGraph, RecipeGraph};
pub use recipe::{Cooked, MultiData, Params, Procedure, QuickRecipe, Recipe, RecipeFn, Serving};
