// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Data source configuration

use crate::pattern::Bindings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to remove from the scratch area at startup
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearTmp {
    /// Keep everything
    Off,
    /// Remove `<root>/tmp`
    #[default]
    Default,
    /// Remove this path (relative to the root, slots filled from vars)
    Path(String),
}

/// Configuration for a [`DataSource`](super::DataSource)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Root directory every dataset path is relative to
    pub data_root: PathBuf,

    /// Directory holding declaration files; `<data_root>/conf` when unset
    pub config_root: Option<PathBuf>,

    /// Keep loaded datasets in memory, keyed by concrete path
    pub cache_in_memory: bool,

    /// Remove `<data_root>/cache` at startup
    pub clear_cache: bool,

    /// Scratch cleanup at startup
    pub clear_tmp: ClearTmp,

    /// Ambient bindings substituted into every path
    pub vars: Bindings,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            config_root: None,
            cache_in_memory: false,
            clear_cache: false,
            clear_tmp: ClearTmp::Default,
            vars: Bindings::new(),
        }
    }
}

impl DataSourceConfig {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            ..Self::default()
        }
    }

    /// Directory holding declaration files
    pub fn config_dir(&self) -> PathBuf {
        self.config_root
            .clone()
            .unwrap_or_else(|| self.data_root.join("conf"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_defaults_under_root() {
        let config = DataSourceConfig::new("/data");
        assert_eq!(config.config_dir(), PathBuf::from("/data/conf"));
        assert_eq!(config.clear_tmp, ClearTmp::Default);
    }

    #[test]
    fn test_config_deserializes() {
        let config: DataSourceConfig = serde_json::from_str(
            r#"{"data_root": "/d", "config_root": null, "cache_in_memory": true,
                "clear_cache": false, "clear_tmp": {"path": "tmp/{run}"}, "vars": {"run": "1"}}"#,
        )
        .unwrap();
        assert!(config.cache_in_memory);
        assert_eq!(config.clear_tmp, ClearTmp::Path("tmp/{run}".into()));
        assert_eq!(config.vars["run"], "1");
    }
}
