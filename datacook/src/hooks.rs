// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Load and dump hooks
//!
//! A hook transforms a dataset right after it is read from its backend (load
//! hook) or right before it is written (dump hook). Hooks are keyed by the
//! dataset's canonical pattern.

use crate::cookbook::BoxError;
use crate::storage::Data;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type HookFn = Arc<dyn Fn(Data) -> Result<Data, BoxError> + Send + Sync>;

/// One set of load and dump hooks
#[derive(Clone, Default)]
pub struct Hooks {
    load_hooks: HashMap<String, HookFn>,
    dump_hooks: HashMap<String, HookFn>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load<F>(&mut self, dataset: impl Into<String>, hook: F) -> &mut Self
    where
        F: Fn(Data) -> Result<Data, BoxError> + Send + Sync + 'static,
    {
        self.load_hooks.insert(dataset.into(), Arc::new(hook));
        self
    }

    pub fn on_dump<F>(&mut self, dataset: impl Into<String>, hook: F) -> &mut Self
    where
        F: Fn(Data) -> Result<Data, BoxError> + Send + Sync + 'static,
    {
        self.dump_hooks.insert(dataset.into(), Arc::new(hook));
        self
    }

    pub fn load_hook(&self, dataset: &str) -> Option<&HookFn> {
        self.load_hooks.get(dataset)
    }

    pub fn dump_hook(&self, dataset: &str) -> Option<&HookFn> {
        self.dump_hooks.get(dataset)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut load: Vec<_> = self.load_hooks.keys().collect();
        let mut dump: Vec<_> = self.dump_hooks.keys().collect();
        load.sort();
        dump.sort();
        f.debug_struct("Hooks")
            .field("load", &load)
            .field("dump", &dump)
            .finish()
    }
}

/// Apply every matching hook across hook sets, in registration order
pub(crate) fn apply_chain<'a, I, F>(hook_sets: I, lookup: F, mut data: Data) -> Result<Data, BoxError>
where
    I: IntoIterator<Item = &'a Hooks>,
    F: Fn(&'a Hooks) -> Option<&'a HookFn>,
{
    for hooks in hook_sets {
        if let Some(hook) = lookup(hooks) {
            data = hook(data)?;
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hooks_apply_in_order() {
        let mut first = Hooks::new();
        first.on_load("a.json", |data| match data {
            Data::Json(v) => Ok(Data::Json(json!([v, "first"]))),
            other => Ok(other),
        });
        let mut second = Hooks::new();
        second.on_load("a.json", |data| match data {
            Data::Json(v) => Ok(Data::Json(json!([v, "second"]))),
            other => Ok(other),
        });

        let sets = vec![first, second];
        let out = apply_chain(&sets, |h| h.load_hook("a.json"), Data::Json(json!(0))).unwrap();
        assert_eq!(out, Data::Json(json!([[0, "first"], "second"])));

        let untouched = apply_chain(&sets, |h| h.dump_hook("a.json"), Data::Json(json!(0))).unwrap();
        assert_eq!(untouched, Data::Json(json!(0)));
    }
}
