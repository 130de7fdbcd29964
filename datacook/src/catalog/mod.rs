// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dataset catalog
//!
//! Declarative registry of dataset locations, their schemas and the
//! configuration namespaces they are declared alongside.

pub mod declaration;
pub mod entry;
pub mod error;
pub mod manager;

pub use declaration::{deep_merge, Declaration, DeclarationLoader};
pub use entry::{DatasetConfig, DatasetEntry, FieldSchema};
pub use error::{CatalogError, CatalogResult};
pub use manager::Catalog;
