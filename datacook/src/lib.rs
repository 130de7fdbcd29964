// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! datacook - A declarative build engine for derived tabular datasets
//!
//! datacook keeps a catalog of named, possibly parameterized dataset
//! locations and a set of recipes that produce some datasets from others.
//! Requesting a dataset that does not exist yet finds a chain of recipes that
//! can produce it, generates any missing upstream datasets first, and stores
//! every result so repeated requests are plain reads.
//!
//! # Features
//!
//! - **Path patterns**: `sales/{region}/{day}.csv` style locations with slot
//!   binding and substitution
//! - **Declarative catalog**: JSON declarations with defaults, typed field
//!   schemas and includes
//! - **Recipe search**: depth-first, first-fit planning with cycle detection
//! - **Join planner**: assemble a dataset from others that share field names
//! - **Pluggable stores**: csv, json, line lists, bincode snapshots, a
//!   read-only JSON lines stream and an in-memory store
//!
//! # Usage
//!
//! ```ignore
//! use datacook::{Bindings, CookBook, DataSource, QuickRecipe};
//!
//! let mut book = CookBook::new("Sales");
//! book.quick_recipe(QuickRecipe::Concat, ["sales/{region}/{day}.csv"], ["sales/all.csv"]);
//!
//! let ds = DataSource::builder("./data").cookbook(book).build()?;
//! let all = ds.load("sales/all.csv", &Bindings::new())?;
//! ```

pub mod catalog;
pub mod cookbook;
pub mod engine;
pub mod hooks;
pub mod pattern;
pub mod planner;
pub mod storage;
pub mod types;

pub use catalog::{Catalog, DatasetEntry, Declaration};
pub use cookbook::{CookBook, Cooked, MultiData, Params, QuickRecipe, Recipe, RecipeGraph, Serving};
pub use engine::{ClearTmp, DataSource, DataSourceBuilder, DataSourceConfig, EngineError, EngineResult};
pub use hooks::Hooks;
pub use pattern::{Bindings, PathPattern};
pub use planner::{JoinPlan, JoinStep, JoinTarget, RelatedData};
pub use storage::{Data, DataStore, JoinKind, Table, Value};
pub use types::FieldType;

/// datacook version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// datacook crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
