// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Recipe graph
//!
//! Composes several cookbooks into the search space the engine plans over.
//! Candidate order is cookbook insertion order, then registration order.

use super::book::CookBook;
use super::recipe::Recipe;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::sync::Arc;

/// Dataset dependency graph: an edge runs from ingredient to dish and is
/// labelled with the recipe name
pub type DependencyGraph = DiGraph<String, String>;

#[derive(Debug, Clone, Default)]
pub struct RecipeGraph {
    books: Vec<CookBook>,
}

impl RecipeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cookbook; later cookbooks are searched after earlier ones
    pub fn add_book(&mut self, book: CookBook) -> &mut Self {
        if self.books.iter().any(|b| b.name() == book.name()) {
            log::warn!("CookBook {} registered more than once", book.name());
        }
        self.books.push(book);
        self
    }

    pub fn books(&self) -> &[CookBook] {
        &self.books
    }

    /// Every recipe that lists `dish`
    pub fn candidates(&self, dish: &str) -> Vec<&Arc<Recipe>> {
        self.books.iter().flat_map(|b| b.search(dish)).collect()
    }

    pub fn recipes(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.books.iter().flat_map(|b| b.recipes().iter())
    }

    pub fn is_empty(&self) -> bool {
        self.books.iter().all(CookBook::is_empty)
    }

    /// Full recipe index, one line per recipe, grouped by cookbook and dish
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for book in &self.books {
            lines.push(format!("[{}]", book.name()));
            lines.extend(book.list_recipes());
        }
        lines
    }

    /// Dataset-level dependency graph over declared recipe patterns
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
        let mut node = |graph: &mut DependencyGraph, name: &str| -> NodeIndex {
            *nodes
                .entry(name.to_string())
                .or_insert_with(|| graph.add_node(name.to_string()))
        };

        for recipe in self.recipes() {
            for dish in recipe.dishes() {
                let to = node(&mut graph, dish);
                for ingredient in recipe.ingredients() {
                    let from = node(&mut graph, ingredient);
                    graph.add_edge(from, to, recipe.name());
                }
            }
        }
        graph
    }

    /// A cycle among recipe patterns, if any, as the dataset names on it
    ///
    /// This only sees literal pattern equality; cycles that appear once slots
    /// are bound are still caught during generation.
    pub fn find_static_cycle(&self) -> Option<Vec<String>> {
        let graph = self.dependency_graph();
        for component in tarjan_scc(&graph) {
            let cyclic = component.len() > 1
                || component
                    .first()
                    .map(|&n| graph.contains_edge(n, n))
                    .unwrap_or(false);
            if cyclic {
                let mut names: Vec<String> = component
                    .iter()
                    .filter_map(|&n| graph.node_weight(n).cloned())
                    .collect();
                names.sort();
                return Some(names);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Data;

    fn pass_through(book: &mut CookBook, name: &str, from: &str, to: &str) {
        book.recipe(name, [from], [to], |inputs, _| Ok(inputs[0].clone().into()));
    }

    #[test]
    fn test_candidates_follow_book_order() {
        let mut first = CookBook::new("First");
        pass_through(&mut first, "a", "x.csv", "y.csv");
        let mut second = CookBook::new("Second");
        pass_through(&mut second, "b", "z.csv", "y.csv");

        let mut graph = RecipeGraph::new();
        graph.add_book(first).add_book(second);

        let names: Vec<_> = graph.candidates("y.csv").iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["First.a", "Second.b"]);
        assert_eq!(graph.describe()[0], "[First]");
    }

    #[test]
    fn test_static_cycle_detected() {
        let mut book = CookBook::new("Loop");
        pass_through(&mut book, "ab", "a.csv", "b.csv");
        pass_through(&mut book, "bc", "b.csv", "c.csv");
        pass_through(&mut book, "ca", "c.csv", "a.csv");
        book.recipe("leaf", Vec::<String>::new(), ["d.csv"], |_, _| {
            Ok(Data::Lines(vec![]).into())
        });

        let mut graph = RecipeGraph::new();
        graph.add_book(book);
        assert_eq!(
            graph.find_static_cycle(),
            Some(vec!["a.csv".to_string(), "b.csv".to_string(), "c.csv".to_string()])
        );
    }

    #[test]
    fn test_acyclic_graph() {
        let mut book = CookBook::new("Line");
        pass_through(&mut book, "ab", "a.csv", "b.csv");
        pass_through(&mut book, "bc", "b.csv", "c.csv");

        let mut graph = RecipeGraph::new();
        graph.add_book(book);
        assert!(graph.find_static_cycle().is_none());
        assert_eq!(graph.dependency_graph().edge_count(), 2);
    }
}
