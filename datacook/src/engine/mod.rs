// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Resolution and generation engine
//!
//! [`DataSource`] is the entry point: it resolves dataset names through the
//! catalog, reads and writes them through the registered stores, and
//! generates missing datasets by searching the recipe graph.
//!
//! ```text
//! load(name) ──► resolve ──► exists? ──yes──► store.load ► hooks ► schema ► cache
//!                               │
//!                               no
//!                               ▼
//!                 search recipes ► run plan ► dump dishes ► reload
//! ```

pub mod config;
pub mod error;
pub mod generate;
pub mod resolve;

pub use config::{ClearTmp, DataSourceConfig};
pub use error::{EngineError, EngineResult};
pub use generate::Fallback;
pub use resolve::Target;

use crate::catalog::{Catalog, Declaration, DeclarationLoader, FieldSchema};
use crate::cookbook::{CookBook, Params, RecipeGraph};
use crate::hooks::Hooks;
use crate::pattern::{substitute, Bindings};
use crate::storage::{Data, DataStore, StoreRegistry, Value};
use crate::types::{FieldType, TypeRegistry, TypeResult};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Declaration file looked up in the config directory when none is given
pub const DEFAULT_DECLARATION_FILE: &str = "datacook.json";

/// Declarative dataset source
///
/// All operations take `&self`; the only interior state is the read cache.
pub struct DataSource {
    pub(crate) config: DataSourceConfig,
    pub(crate) catalog: Catalog,
    pub(crate) recipes: RecipeGraph,
    pub(crate) hooks: Vec<Hooks>,
    pub(crate) stores: StoreRegistry,
    pub(crate) types: TypeRegistry,
    pub(crate) cache: RwLock<HashMap<PathBuf, Data>>,
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("data_root", &self.config.data_root)
            .field("entries", &self.catalog.len())
            .field("stores", &self.stores)
            .finish()
    }
}

impl DataSource {
    pub fn builder(data_root: impl Into<PathBuf>) -> DataSourceBuilder {
        DataSourceBuilder::new(data_root)
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.data_root
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn recipes(&self) -> &RecipeGraph {
        &self.recipes
    }

    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    pub fn vars(&self) -> &Bindings {
        &self.config.vars
    }

    /// The `PARAMS` namespace
    pub fn params(&self) -> &Params {
        self.catalog.params()
    }

    /// A parameter by name, falling back to the ambient vars
    pub fn param(&self, name: &str) -> Option<serde_json::Value> {
        self.catalog
            .params()
            .get(name)
            .cloned()
            .or_else(|| self.config.vars.get(name).map(|v| serde_json::Value::String(v.clone())))
    }

    /// Schema of the entry `name` resolves to
    pub fn field_schema(&self, name: &str) -> EngineResult<&FieldSchema> {
        if let Some((entry, _)) = self.catalog.resolve(name) {
            return Ok(entry.fields());
        }
        Ok(self.catalog.entry(name)?.fields())
    }

    /// Field names of the entry `name` resolves to, in schema order
    pub fn fields(&self, name: &str) -> EngineResult<Vec<String>> {
        Ok(self.field_schema(name)?.keys().cloned().collect())
    }

    /// Custom field type names used by the catalog that have no registered cast
    ///
    /// Schema enforcement fails with `TypeError::UnknownType` on these fields.
    pub fn unregistered_field_types(&self) -> Vec<String> {
        let mut missing = BTreeSet::new();
        let schemas = self
            .catalog
            .entries()
            .map(|e| e.fields())
            .chain(std::iter::once(self.catalog.all_fields()));
        for schema in schemas {
            for field_type in schema.values() {
                if let FieldType::Custom(name) = field_type {
                    if !self.types.contains(name) {
                        missing.insert(name.clone());
                    }
                }
            }
        }
        missing.into_iter().collect()
    }

    fn clean_startup(&self) -> EngineResult<()> {
        let tmp = match &self.config.clear_tmp {
            ClearTmp::Off => None,
            ClearTmp::Default => Some(self.real_path("tmp")),
            ClearTmp::Path(pattern) => {
                let path = substitute(pattern, &self.config.vars, &Bindings::new());
                Some(self.real_path(&path))
            }
        };
        if let Some(tmp) = tmp {
            remove_dir_if_exists(&tmp)?;
        }
        if self.config.clear_cache {
            remove_dir_if_exists(&self.real_path("cache"))?;
        }
        Ok(())
    }
}

fn remove_dir_if_exists(path: &Path) -> EngineResult<()> {
    if path.is_dir() {
        log::info!("Clearing {}", path.display());
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

/// Builder for [`DataSource`]
///
/// Cookbooks, hooks, stores and custom types are registered explicitly.
///
/// # Examples
/// ```ignore
/// let mut book = CookBook::new("Scores");
/// book.quick_recipe(QuickRecipe::Concat, ["a.csv", "b.csv"], ["ab.csv"]);
///
/// let ds = DataSource::builder("/data")
///     .declaration_file("/data/conf/datacook.json")
///     .cookbook(book)
///     .cache_in_memory(true)
///     .build()?;
/// let ab = ds.load("ab.csv", &Bindings::new())?;
/// ```
pub struct DataSourceBuilder {
    config: DataSourceConfig,
    declarations: Vec<Declaration>,
    declaration_files: Vec<PathBuf>,
    recipes: RecipeGraph,
    hooks: Vec<Hooks>,
    stores: StoreRegistry,
    types: TypeRegistry,
}

impl DataSourceBuilder {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self::from_config(DataSourceConfig::new(data_root))
    }

    pub fn from_config(config: DataSourceConfig) -> Self {
        Self {
            config,
            declarations: Vec::new(),
            declaration_files: Vec::new(),
            recipes: RecipeGraph::new(),
            hooks: Vec::new(),
            stores: StoreRegistry::with_defaults(),
            types: TypeRegistry::new(),
        }
    }

    pub fn config_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config_root = Some(path.into());
        self
    }

    pub fn cache_in_memory(mut self, enabled: bool) -> Self {
        self.config.cache_in_memory = enabled;
        self
    }

    pub fn clear_cache(mut self, enabled: bool) -> Self {
        self.config.clear_cache = enabled;
        self
    }

    pub fn clear_tmp(mut self, clear: ClearTmp) -> Self {
        self.config.clear_tmp = clear;
        self
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.vars.insert(name.into(), value.into());
        self
    }

    pub fn declaration(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    pub fn declarations(mut self, declarations: impl IntoIterator<Item = Declaration>) -> Self {
        self.declarations.extend(declarations);
        self
    }

    /// Declaration file applied before inline declarations
    pub fn declaration_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.declaration_files.push(path.into());
        self
    }

    pub fn cookbook(mut self, book: CookBook) -> Self {
        self.recipes.add_book(book);
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks.push(hooks);
        self
    }

    pub fn store<S: DataStore + 'static>(mut self, store: S) -> Self {
        self.stores.register(store);
        self
    }

    /// Register a cast for a custom field type name
    pub fn custom_type<F>(mut self, name: impl Into<String>, cast: F) -> Self
    where
        F: Fn(&Value) -> TypeResult<Value> + Send + Sync + 'static,
    {
        self.types.register(name, cast);
        self
    }

    /// Build the catalog and run startup cleanup
    ///
    /// When neither declaration files nor inline declarations were given,
    /// `<config dir>/datacook.json` is loaded if present.
    ///
    /// # Errors
    /// * `EngineError::Catalog` for unreadable or invalid declarations
    /// * `EngineError::Io` if the data root cannot be created or cleaned
    pub fn build(self) -> EngineResult<DataSource> {
        let mut files = self.declaration_files;
        if files.is_empty() && self.declarations.is_empty() {
            let default = self.config.config_dir().join(DEFAULT_DECLARATION_FILE);
            if default.is_file() {
                files.push(default);
            }
        }

        let mut declarations = Vec::new();
        for file in &files {
            declarations.extend(DeclarationLoader::new().load_file(file)?);
        }
        declarations.extend(self.declarations);
        let catalog = Catalog::from_declarations(declarations)?;

        for tag in catalog.entries().map(|e| e.type_tag()) {
            if !self.stores.contains(tag) {
                log::warn!("No store registered for type '{}'", tag);
            }
        }
        if let Some(cycle) = self.recipes.find_static_cycle() {
            log::warn!("Recipe graph has a cycle through {}", cycle.join(", "));
        }

        fs::create_dir_all(&self.config.data_root)?;
        let source = DataSource {
            config: self.config,
            catalog,
            recipes: self.recipes,
            hooks: self.hooks,
            stores: self.stores,
            types: self.types,
            cache: RwLock::new(HashMap::new()),
        };
        for name in source.unregistered_field_types() {
            log::warn!("No cast registered for field type '{}'", name);
        }
        source.clean_startup()?;
        log::debug!("Built {:?}", source);
        Ok(source)
    }
}
