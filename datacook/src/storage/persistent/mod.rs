// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage backends
//!
//! This module provides the trait-based capability contract the engine uses to
//! persist datasets, allowing different formats to be used interchangeably.
//!
//! # Architecture
//!
//! ```text
//! DataSource (resolution, schema enforcement, hooks)
//!     ↓
//! StoreRegistry (type tag → backend)
//!     ↓
//! Concrete Implementations (csv, json, str_list, bincode, jsonl_stream, memory)
//! ```

// Core modules
pub mod factory;
pub mod traits;
pub mod types;

// Store implementations
pub mod bincode;
pub mod csv;
pub mod json;
pub mod lines;
pub mod memory;
pub mod stream;

// Public API re-exports
pub use self::bincode::BincodeStore;
pub use self::csv::CsvStore;
pub use factory::StoreRegistry;
pub use json::JsonStore;
pub use lines::LinesStore;
pub use memory::MemoryStore;
pub use stream::JsonLinesStreamStore;
pub use traits::DataStore;
pub use types::{StoreError, StoreResult};
