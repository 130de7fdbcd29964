// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Recipes
//!
//! A recipe turns loaded ingredient datasets into one value per dish. The
//! procedure is either a user function, one of the built-in quick recipes, or
//! an automatic join that the engine plans from field names.

use super::error::{BoxError, RecipeError, RecipeResult};
use crate::pattern::Bindings;
use crate::storage::{Data, JoinKind, Table, Value};
use std::fmt;
use std::sync::Arc;

/// Parameters passed to recipes, taken from the `PARAMS` namespace
pub type Params = serde_json::Map<String, serde_json::Value>;

/// User procedure signature
pub type RecipeFn = Arc<dyn Fn(&[Data], &Params) -> Result<Cooked, BoxError> + Send + Sync>;

/// One dish value split into several datasets
///
/// Each part carries extra bindings substituted into the dish pattern's slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiData {
    parts: Vec<(Data, Bindings)>,
}

impl MultiData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, data: impl Into<Data>, bindings: Bindings) -> &mut Self {
        self.parts.push((data.into(), bindings));
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Data, Bindings)> {
        self.parts.iter()
    }
}

impl IntoIterator for MultiData {
    type Item = (Data, Bindings);
    type IntoIter = std::vec::IntoIter<(Data, Bindings)>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

/// The value produced for one dish
#[derive(Debug, Clone, PartialEq)]
pub enum Serving {
    Single(Data),
    Split(MultiData),
}

/// Everything a procedure produced, one serving per dish
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cooked(pub Vec<Serving>);

impl Cooked {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Data> for Cooked {
    fn from(data: Data) -> Self {
        Cooked(vec![Serving::Single(data)])
    }
}

impl From<Table> for Cooked {
    fn from(table: Table) -> Self {
        Data::Table(table).into()
    }
}

impl From<MultiData> for Cooked {
    fn from(multi: MultiData) -> Self {
        Cooked(vec![Serving::Split(multi)])
    }
}

impl From<Serving> for Cooked {
    fn from(serving: Serving) -> Self {
        Cooked(vec![serving])
    }
}

impl From<Vec<Data>> for Cooked {
    fn from(items: Vec<Data>) -> Self {
        Cooked(items.into_iter().map(Serving::Single).collect())
    }
}

impl From<Vec<Serving>> for Cooked {
    fn from(servings: Vec<Serving>) -> Self {
        Cooked(servings)
    }
}

/// Built-in table procedures
#[derive(Debug, Clone, PartialEq)]
pub enum QuickRecipe {
    /// Stack every ingredient table
    Concat,
    /// Join the ingredient tables left to right
    Merge { on: Vec<String>, how: JoinKind },
    /// Split the single ingredient by the values of `field`
    GroupBy { field: String },
}

impl QuickRecipe {
    pub fn name(&self) -> &'static str {
        match self {
            QuickRecipe::Concat => "concat",
            QuickRecipe::Merge { .. } => "merge",
            QuickRecipe::GroupBy { .. } => "groupby",
        }
    }

    fn cook(&self, recipe: &str, ingredients: &[Data]) -> RecipeResult<Cooked> {
        let tables: Vec<&Table> = ingredients.iter().flat_map(Data::tables).collect();
        if tables.is_empty() {
            return Err(RecipeError::InvalidIngredients {
                recipe: recipe.to_string(),
                reason: "no tabular ingredients".to_string(),
            });
        }
        match self {
            QuickRecipe::Concat => Ok(Table::concat(tables).into()),
            QuickRecipe::Merge { on, how } => {
                let mut tables = tables.into_iter();
                let mut merged = tables.next().cloned().unwrap_or_default();
                for table in tables {
                    merged = merged
                        .join(table, on, *how)
                        .map_err(|e| RecipeError::failed(recipe, e))?;
                }
                Ok(merged.into())
            }
            QuickRecipe::GroupBy { field } => {
                if tables.len() != 1 {
                    return Err(RecipeError::InvalidIngredients {
                        recipe: recipe.to_string(),
                        reason: format!("groupby takes one table, got {}", tables.len()),
                    });
                }
                let groups = tables[0]
                    .group_by(field)
                    .map_err(|e| RecipeError::failed(recipe, e))?;
                let mut multi = MultiData::new();
                for (key, group) in groups {
                    let mut bindings = Bindings::new();
                    bindings.insert(field.clone(), key_to_binding(&key));
                    multi.add(group, bindings);
                }
                Ok(multi.into())
            }
        }
    }
}

fn key_to_binding(key: &Value) -> String {
    match key {
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// How a recipe produces its dishes
#[derive(Clone)]
pub enum Procedure {
    Func(RecipeFn),
    Quick(QuickRecipe),
    /// Assemble the dish from other datasets by the join planner
    AutoJoin { how: JoinKind },
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::Func(_) => f.write_str("Func(..)"),
            Procedure::Quick(q) => f.debug_tuple("Quick").field(q).finish(),
            Procedure::AutoJoin { how } => f.debug_struct("AutoJoin").field("how", how).finish(),
        }
    }
}

/// A rule producing dish datasets from ingredient datasets
#[derive(Debug, Clone)]
pub struct Recipe {
    procedure_name: String,
    book: String,
    ingredients: Vec<String>,
    dishes: Vec<String>,
    params: Vec<String>,
    bindings: Bindings,
    procedure: Procedure,
}

impl Recipe {
    /// Recipe backed by a user function
    pub fn new<I, D, F>(name: &str, ingredients: I, dishes: D, func: F) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
        F: Fn(&[Data], &Params) -> Result<Cooked, BoxError> + Send + Sync + 'static,
    {
        Self::with_procedure(name, ingredients, dishes, Procedure::Func(Arc::new(func)))
    }

    pub fn with_procedure<I, D>(name: &str, ingredients: I, dishes: D, procedure: Procedure) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            procedure_name: name.to_string(),
            book: String::new(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            dishes: dishes.into_iter().map(Into::into).collect(),
            params: Vec::new(),
            bindings: Bindings::new(),
            procedure,
        }
    }

    /// Parameter names the procedure accepts; others are not passed
    pub fn with_params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Bindings applied to every dish this recipe dumps
    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub(crate) fn set_book(&mut self, book: &str) {
        self.book = book.to_string();
    }

    /// Display name, `<CookBook>.<procedure>`
    pub fn name(&self) -> String {
        if self.book.is_empty() {
            self.procedure_name.clone()
        } else {
            format!("{}.{}", self.book, self.procedure_name)
        }
    }

    pub fn book(&self) -> &str {
        &self.book
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn dishes(&self) -> &[String] {
        &self.dishes
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    /// One-line signature used in diagnostics
    pub fn signature(&self) -> String {
        format!("{:?} => {:?}: {}", self.ingredients, self.dishes, self.name())
    }

    /// Run the procedure and pair every produced value with its dish
    ///
    /// Only the parameters this recipe declares are passed. A split serving
    /// yields one output per part, carrying the part's bindings.
    ///
    /// # Errors
    /// * `RecipeError::Failed` if the procedure returns an error
    /// * `RecipeError::OutputArity` if the number of servings differs from the
    ///   number of dishes
    /// * `RecipeError::RequiresPlanner` for automatic join recipes, which the
    ///   engine runs itself
    pub fn execute(&self, ingredients: &[Data], params: &Params) -> RecipeResult<Vec<(String, Data, Bindings)>> {
        let name = self.name();
        let cooked = match &self.procedure {
            Procedure::Func(func) => {
                let accepted: Params = params
                    .iter()
                    .filter(|(key, _)| self.params.iter().any(|p| p == *key))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                func(ingredients, &accepted).map_err(|source| RecipeError::Failed {
                    recipe: name.clone(),
                    source,
                })?
            }
            Procedure::Quick(quick) => quick.cook(&name, ingredients)?,
            Procedure::AutoJoin { .. } => return Err(RecipeError::RequiresPlanner(name)),
        };
        self.serve(cooked)
    }

    /// Pair servings with dishes, expanding split servings
    ///
    /// # Errors
    /// * `RecipeError::OutputArity` on a serving count mismatch
    pub fn serve(&self, cooked: Cooked) -> RecipeResult<Vec<(String, Data, Bindings)>> {
        if cooked.len() != self.dishes.len() {
            return Err(RecipeError::OutputArity {
                recipe: self.name(),
                expected: self.dishes.len(),
                found: cooked.len(),
            });
        }
        let mut out = Vec::new();
        for (dish, serving) in self.dishes.iter().zip(cooked.0) {
            match serving {
                Serving::Single(data) => out.push((dish.clone(), data, Bindings::new())),
                Serving::Split(multi) => {
                    for (data, bindings) in multi {
                        out.push((dish.clone(), data, bindings));
                    }
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(cols: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(cols.iter().copied(), rows).unwrap()
    }

    #[test]
    fn test_only_declared_params_are_passed() {
        let recipe = Recipe::new("count", Vec::<String>::new(), ["out.json"], |_, params| {
            Ok(Data::Json(json!(params.keys().cloned().collect::<Vec<_>>())).into())
        })
        .with_params(["threshold"]);

        let mut params = Params::new();
        params.insert("threshold".into(), json!(3));
        params.insert("other".into(), json!(true));

        let out = recipe.execute(&[], &params).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].1, Data::Json(json!(["threshold"])));
    }

    #[test]
    fn test_output_arity_mismatch() {
        let recipe = Recipe::new("two", Vec::<String>::new(), ["a.json", "b.json"], |_, _| {
            Ok(Data::Json(json!(1)).into())
        });
        let err = recipe.execute(&[], &Params::new()).unwrap_err();
        assert!(matches!(
            err,
            RecipeError::OutputArity {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_procedure_error_is_wrapped() {
        let mut recipe = Recipe::new("boom", Vec::<String>::new(), ["a.json"], |_, _| {
            Err("exploded".into())
        });
        recipe.set_book("Book");
        let err = recipe.execute(&[], &Params::new()).unwrap_err();
        match err {
            RecipeError::Failed { recipe, source } => {
                assert_eq!(recipe, "Book.boom");
                assert_eq!(source.to_string(), "exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_groupby_splits_with_bindings() {
        let recipe = Recipe::with_procedure(
            "groupby",
            ["all.csv"],
            ["by_day/{day}.csv"],
            Procedure::Quick(QuickRecipe::GroupBy {
                field: "day".into(),
            }),
        );
        let input = table(
            &["day", "v"],
            vec![
                vec!["mon".into(), 1i64.into()],
                vec!["tue".into(), 2i64.into()],
                vec!["mon".into(), 3i64.into()],
            ],
        );
        let out = recipe.execute(&[input.into()], &Params::new()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].2["day"], "mon");
        assert_eq!(out[0].1.as_table().unwrap().num_rows(), 2);
        assert_eq!(out[1].2["day"], "tue");
    }

    #[test]
    fn test_merge_quick_recipe() {
        let recipe = Recipe::with_procedure(
            "merge",
            ["a.csv", "b.csv"],
            ["ab.csv"],
            Procedure::Quick(QuickRecipe::Merge {
                on: vec!["id".into()],
                how: JoinKind::Inner,
            }),
        );
        let a = table(&["id", "name"], vec![vec![1i64.into(), "x".into()]]);
        let b = table(&["id", "score"], vec![vec![1i64.into(), 2.5.into()]]);
        let out = recipe.execute(&[a.into(), b.into()], &Params::new()).unwrap();
        let merged = out[0].1.as_table().unwrap();
        assert_eq!(merged.columns(), &["id", "name", "score"]);
        assert_eq!(merged.num_rows(), 1);
    }
}
