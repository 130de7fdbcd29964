//! Test fixture for datacook integration tests
//!
//! Provides an isolated data root and helpers to seed files and declarations,
//! using only the public `DataSource` API.

#![allow(dead_code)]

use datacook::{Bindings, DataSource, DataSourceBuilder, Declaration};
use std::fs;
use std::path::{Path, PathBuf};

/// Test fixture with an isolated data root
pub struct TestFixture {
    root: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl TestFixture {
    /// Create a new fixture with an empty data root
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        init_logging();
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().join("data");
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            _temp_dir: temp_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a dataset relative to the root
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Write a file under the root, creating parent directories
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("Failed to read fixture file")
    }

    /// Builder over this root with the given declaration document
    pub fn builder(&self, declarations: serde_json::Value) -> DataSourceBuilder {
        let declarations =
            Declaration::from_document(declarations).expect("Invalid declaration document");
        DataSource::builder(&self.root).declarations(declarations)
    }

    /// Data source over this root with no cookbooks
    pub fn source(&self, declarations: serde_json::Value) -> DataSource {
        self.builder(declarations)
            .build()
            .expect("Failed to build data source")
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn no_vars() -> Bindings {
    Bindings::new()
}

pub fn vars(pairs: &[(&str, &str)]) -> Bindings {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
