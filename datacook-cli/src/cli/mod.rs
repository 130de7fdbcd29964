// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for datacook
//!
//! Read-mostly inspection of a data root: catalog entries, path resolution,
//! join plans and dataset contents. Recipes are registered from code, so the
//! CLI never generates datasets.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_delete, handle_entries, handle_fields, handle_plan, handle_related, handle_resolve,
    handle_show, handle_view, open_source,
};
