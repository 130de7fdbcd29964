// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Recipe search and generation
//!
//! Search walks the recipe graph depth-first from the requested dataset: the
//! first candidate recipe whose ingredients all exist or are themselves
//! producible wins. The resulting plan is an ordered list of recipes that is
//! then executed, skipping any recipe whose dishes already exist.

use super::error::{EngineError, EngineResult};
use super::DataSource;
use crate::cookbook::{BoxError, Procedure, Recipe};
use crate::pattern::Bindings;
use crate::planner::JoinTarget;
use crate::storage::Data;
use std::sync::Arc;

/// Producer used when no recipe can generate a dataset
pub type Fallback<'f> = Box<dyn FnOnce() -> Result<Data, BoxError> + 'f>;

/// Datasets being searched or generated within one top-level request
#[derive(Debug, Default)]
pub(crate) struct Trail {
    stack: Vec<String>,
    cycle: Option<Vec<String>>,
}

impl Trail {
    /// The loop closed by revisiting `key`, if it is already on the stack
    fn cycle_through(&self, key: &str) -> Option<Vec<String>> {
        let start = self.stack.iter().position(|k| k == key)?;
        let mut cycle = self.stack[start..].to_vec();
        cycle.push(key.to_string());
        Some(cycle)
    }
}

impl DataSource {
    /// Find a plan producing `name`
    ///
    /// Returns `Some(vec![])` when the dataset already exists, `Some(steps)`
    /// with recipes in execution order when it can be generated, and `None`
    /// when no recipe chain reaches it.
    pub fn search_recipes(&self, name: &str, vars: &Bindings) -> EngineResult<Option<Vec<Arc<Recipe>>>> {
        self.search_inner(name, vars, &mut Trail::default())
    }

    /// Whether `name` exists or some recipe chain can produce it
    pub fn can_generate(&self, name: &str, vars: &Bindings) -> EngineResult<bool> {
        Ok(self.search_recipes(name, vars)?.is_some())
    }

    pub(crate) fn can_generate_inner(
        &self,
        name: &str,
        vars: &Bindings,
        trail: &mut Trail,
    ) -> EngineResult<bool> {
        Ok(self.search_inner(name, vars, trail)?.is_some())
    }

    fn search_inner(
        &self,
        name: &str,
        vars: &Bindings,
        trail: &mut Trail,
    ) -> EngineResult<Option<Vec<Arc<Recipe>>>> {
        let target = self.resolve(name, vars)?;
        if self.target_exists(&target)? {
            return Ok(Some(Vec::new()));
        }

        let key = target.concrete.clone();
        if let Some(cycle) = trail.cycle_through(&key) {
            log::debug!("Dependency cycle while searching: {}", cycle.join(" -> "));
            trail.cycle.get_or_insert(cycle);
            return Ok(None);
        }

        trail.stack.push(key);
        let found = self.search_candidates(&target.pattern, &target.bindings, trail);
        trail.stack.pop();
        found
    }

    fn search_candidates(
        &self,
        dish: &str,
        bindings: &Bindings,
        trail: &mut Trail,
    ) -> EngineResult<Option<Vec<Arc<Recipe>>>> {
        'candidates: for recipe in self.recipes.candidates(dish) {
            let vars = with_recipe_bindings(bindings, recipe);
            let mut steps = Vec::new();
            for ingredient in recipe.ingredients() {
                match self.search_inner(ingredient, &vars, trail)? {
                    Some(found) => steps.extend(found),
                    None => continue 'candidates,
                }
            }
            steps.push(Arc::clone(recipe));
            return Ok(Some(steps));
        }
        Ok(None)
    }

    /// Generate `name` and everything it depends on, then load it
    ///
    /// # Errors
    /// * `EngineError::NoRecipeFound` with the full recipe index if nothing
    ///   can produce the dataset
    /// * `EngineError::DependencyCycle` if the only chains found loop
    /// * `EngineError::RecipeFailed` if a recipe fails; datasets written by
    ///   earlier steps are kept
    pub fn generate(&self, name: &str, vars: &Bindings) -> EngineResult<Data> {
        self.generate_inner(name, vars, None, &mut Trail::default())
    }

    /// Like [`generate`](Self::generate), but when no recipe applies the
    /// dataset is produced by `fallback` and dumped
    pub fn generate_with<F>(&self, name: &str, vars: &Bindings, fallback: F) -> EngineResult<Data>
    where
        F: FnOnce() -> Result<Data, BoxError>,
    {
        self.generate_inner(name, vars, Some(Box::new(fallback)), &mut Trail::default())
    }

    pub(crate) fn generate_inner(
        &self,
        name: &str,
        vars: &Bindings,
        fallback: Option<Fallback<'_>>,
        trail: &mut Trail,
    ) -> EngineResult<Data> {
        let target = self.resolve(name, vars)?;
        let key = target.concrete.clone();
        if let Some(cycle) = trail.cycle_through(&key) {
            return Err(EngineError::DependencyCycle { cycle });
        }

        log::info!("Generating {}", key);
        trail.cycle = None;
        match self.search_inner(name, vars, trail)? {
            Some(steps) => {
                trail.stack.push(key);
                let mut result = Ok(());
                for recipe in &steps {
                    result = self.generate_by_recipe(recipe, &target.bindings, trail);
                    if result.is_err() {
                        break;
                    }
                }
                trail.stack.pop();
                result?;
            }
            None => {
                if let Some(fallback) = fallback {
                    let data = fallback().map_err(|source| EngineError::Fallback {
                        dataset: key.clone(),
                        source,
                    })?;
                    self.dump(name, data, vars)?;
                } else if let Some(cycle) = trail.cycle.take() {
                    return Err(EngineError::DependencyCycle { cycle });
                } else {
                    log::warn!("Cannot find any recipe for {}", key);
                    return Err(EngineError::NoRecipeFound {
                        target: key,
                        recipes: self.recipes.describe(),
                    });
                }
            }
        }
        self.load_inner(name, vars, false, trail)
    }

    /// Run one recipe unless all of its dishes already exist
    fn generate_by_recipe(&self, recipe: &Recipe, bindings: &Bindings, trail: &mut Trail) -> EngineResult<()> {
        let vars = with_recipe_bindings(bindings, recipe);
        let mut all_exist = true;
        for dish in recipe.dishes() {
            if !self.exists(dish, &vars)? {
                all_exist = false;
                break;
            }
        }
        if all_exist {
            log::debug!("Skipping {}: dishes exist", recipe.name());
            return Ok(());
        }

        let mut ingredients = Vec::with_capacity(recipe.ingredients().len());
        for ingredient in recipe.ingredients() {
            ingredients.push(self.load_inner(ingredient, &vars, true, trail)?);
        }

        log::info!(
            "{:?} => {:?} by <{}>",
            recipe.ingredients(),
            recipe.dishes(),
            recipe.name()
        );
        let outputs = match recipe.procedure() {
            Procedure::AutoJoin { how } => {
                let mut outputs = Vec::new();
                for dish in recipe.dishes() {
                    let (table, _) =
                        self.autogen_inner(&JoinTarget::dataset(dish.as_str()), *how, &[], &vars, trail)?;
                    outputs.push((dish.clone(), Data::Table(table), Bindings::new()));
                }
                outputs
            }
            _ => recipe.execute(&ingredients, self.catalog.params())?,
        };

        for (dish, data, split) in outputs {
            let mut dish_vars = vars.clone();
            dish_vars.extend(split);
            self.dump(&dish, data, &dish_vars)?;
        }
        Ok(())
    }

    /// Delete `names`, run `f`, then regenerate `names`
    ///
    /// If `f` fails nothing is regenerated and its error is returned.
    pub fn update<S, F, T>(&self, names: &[S], vars: &Bindings, f: F) -> EngineResult<T>
    where
        S: AsRef<str>,
        F: FnOnce(&Self) -> EngineResult<T>,
    {
        for name in names {
            self.delete(name.as_ref(), vars)?;
        }
        let value = f(self)?;
        for name in names {
            self.generate(name.as_ref(), vars)?;
        }
        Ok(value)
    }
}

fn with_recipe_bindings(bindings: &Bindings, recipe: &Recipe) -> Bindings {
    let mut vars = bindings.clone();
    vars.extend(recipe.bindings().iter().map(|(k, v)| (k.clone(), v.clone())));
    vars
}
