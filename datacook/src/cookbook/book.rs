// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CookBooks group recipes and index them by dish

use super::error::BoxError;
use super::recipe::{Cooked, Params, Procedure, QuickRecipe, Recipe};
use crate::storage::{Data, JoinKind};
use indexmap::IndexMap;
use std::sync::Arc;

/// Named group of recipes with a dish → recipes menu
#[derive(Debug, Clone)]
pub struct CookBook {
    name: String,
    recipes: Vec<Arc<Recipe>>,
    menu: IndexMap<String, Vec<usize>>,
}

impl CookBook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recipes: Vec::new(),
            menu: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a recipe and list it under every one of its dishes
    pub fn register(&mut self, mut recipe: Recipe) -> &mut Self {
        recipe.set_book(&self.name);
        let idx = self.recipes.len();
        for dish in recipe.dishes() {
            self.menu.entry(dish.clone()).or_default().push(idx);
        }
        log::debug!("Registered recipe {}", recipe.name());
        self.recipes.push(Arc::new(recipe));
        self
    }

    /// Register a user procedure
    ///
    /// # Examples
    /// ```ignore
    /// let mut book = CookBook::new("Scores");
    /// book.recipe("double", ["raw.csv"], ["doubled.csv"], |inputs, _params| {
    ///     Ok(inputs[0].clone().into())
    /// });
    /// ```
    pub fn recipe<I, D, F>(&mut self, name: &str, ingredients: I, dishes: D, func: F) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
        F: Fn(&[Data], &Params) -> Result<Cooked, BoxError> + Send + Sync + 'static,
    {
        self.register(Recipe::new(name, ingredients, dishes, func))
    }

    /// Register one of the built-in table procedures
    pub fn quick_recipe<I, D>(&mut self, quick: QuickRecipe, ingredients: I, dishes: D) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let name = quick.name();
        self.register(Recipe::with_procedure(
            name,
            ingredients,
            dishes,
            Procedure::Quick(quick),
        ))
    }

    /// Register a recipe that assembles `dish` from other datasets sharing its
    /// fields
    pub fn auto_recipe(&mut self, dish: &str) -> &mut Self {
        self.register(Recipe::with_procedure(
            "auto",
            Vec::<String>::new(),
            [dish],
            Procedure::AutoJoin {
                how: JoinKind::Inner,
            },
        ))
    }

    /// Recipes listing `dish`, in registration order
    pub fn search<'a>(&'a self, dish: &str) -> impl Iterator<Item = &'a Arc<Recipe>> + 'a {
        self.menu
            .get(dish)
            .into_iter()
            .flatten()
            .filter_map(move |&idx| self.recipes.get(idx))
    }

    pub fn recipes(&self) -> &[Arc<Recipe>] {
        &self.recipes
    }

    /// Menu in first-registration order
    pub fn menu(&self) -> impl Iterator<Item = (&str, Vec<&Arc<Recipe>>)> {
        self.menu.iter().map(move |(dish, indices)| {
            (
                dish.as_str(),
                indices.iter().filter_map(|&i| self.recipes.get(i)).collect(),
            )
        })
    }

    /// Menu as printable lines, one heading per dish
    pub fn list_recipes(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (dish, recipes) in self.menu() {
            lines.push(dish.to_string());
            for recipe in recipes {
                lines.push(format!("\t{}", recipe.signature()));
            }
        }
        lines
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_indexes_every_dish() {
        let mut book = CookBook::new("Stats");
        book.recipe("split", ["all.csv"], ["a.csv", "b.csv"], |inputs, _| {
            Ok(vec![inputs[0].clone(), inputs[0].clone()].into())
        })
        .quick_recipe(QuickRecipe::Concat, ["a.csv", "b.csv"], ["ab.csv"])
        .recipe("other_a", ["x.csv"], ["a.csv"], |inputs, _| Ok(inputs[0].clone().into()));

        let names: Vec<String> = book.search("a.csv").map(|r| r.name()).collect();
        assert_eq!(names, vec!["Stats.split", "Stats.other_a"]);
        assert_eq!(book.search("ab.csv").count(), 1);
        assert_eq!(book.search("missing.csv").count(), 0);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_list_recipes_headings() {
        let mut book = CookBook::new("Auto");
        book.auto_recipe("joined.csv");
        let lines = book.list_recipes();
        assert_eq!(lines[0], "joined.csv");
        assert!(lines[1].contains("Auto.auto"));
    }
}
