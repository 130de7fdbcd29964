// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Automatic join planner
//!
//! Assembles a table holding a requested set of fields from the catalog
//! entries that declare them. The entry covering the most requested fields is
//! the base; other entries are joined greedily on the fields already acquired
//! until no further entry adds a missing field. The plan is not globally
//! optimal.

use crate::engine::generate::Trail;
use crate::engine::{DataSource, EngineError, EngineResult};
use crate::pattern::Bindings;
use crate::storage::{Data, JoinKind, RowRef, Table};
use serde::Serialize;

/// What the planner should assemble
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTarget {
    /// The fields of a declared dataset; the dataset itself is not a source
    Dataset(String),
    /// An explicit field list
    Fields(Vec<String>),
}

impl JoinTarget {
    pub fn dataset(name: impl Into<String>) -> Self {
        JoinTarget::Dataset(name.into())
    }

    pub fn fields<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        JoinTarget::Fields(fields.into_iter().map(Into::into).collect())
    }

    fn describe(&self) -> String {
        match self {
            JoinTarget::Dataset(name) => name.clone(),
            JoinTarget::Fields(fields) => format!("fields {:?}", fields),
        }
    }
}

/// Dataset the plan starts from and the columns taken from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinSource {
    pub source: String,
    pub columns: Vec<String>,
}

/// One join: `columns` of `source` joined on `key`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinStep {
    pub source: String,
    pub key: Vec<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinPlan {
    /// Requested fields, in output order
    pub fields: Vec<String>,
    pub base: Option<JoinSource>,
    pub steps: Vec<JoinStep>,
    /// Requested fields no step provides
    pub unresolved: Vec<String>,
}

impl JoinPlan {
    pub fn is_complete(&self) -> bool {
        self.base.is_some() && self.unresolved.is_empty()
    }
}

/// Entries sharing fields with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedData {
    /// `(pattern, matched fields)`, most matched fields first
    pub sources: Vec<(String, Vec<String>)>,
    /// Requested fields no entry declares
    pub unknown: Vec<String>,
}

impl DataSource {
    /// Entries declaring any of `fields`, skipping the patterns in `skip`
    pub fn related_data<S: AsRef<str>>(&self, fields: &[S], skip: &[String]) -> RelatedData {
        let mut sources = self.catalog.fields_providing(fields, skip);
        sources.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let unknown = fields
            .iter()
            .map(|f| f.as_ref())
            .filter(|f| !sources.iter().any(|(_, matched)| matched.iter().any(|m| m == *f)))
            .map(str::to_string)
            .collect();
        RelatedData { sources, unknown }
    }

    /// Report of the entries sharing fields with dataset `name`
    pub fn show_related_data(&self, name: &str) -> EngineResult<Vec<String>> {
        let fields = self.fields(name)?;
        let related = self.related_data(&fields, &[self.canonical_name(name)]);
        let mut lines: Vec<String> = related
            .sources
            .iter()
            .map(|(path, matched)| format!("{:?} in {}", matched, path))
            .collect();
        if !related.unknown.is_empty() {
            lines.push(format!("Fields not found: {:?}", related.unknown));
        }
        Ok(lines)
    }

    /// Plan how to assemble `target` by joining other datasets
    ///
    /// Only candidates that exist or can be generated become join steps.
    pub fn autogen_scheme(&self, target: &JoinTarget, skip: &[String]) -> EngineResult<JoinPlan> {
        self.autogen_scheme_inner(target, skip, &Bindings::new(), &mut Trail::default())
    }

    fn autogen_scheme_inner(
        &self,
        target: &JoinTarget,
        skip: &[String],
        vars: &Bindings,
        trail: &mut Trail,
    ) -> EngineResult<JoinPlan> {
        let mut skip = skip.to_vec();
        let fields = match target {
            JoinTarget::Dataset(name) => {
                skip.push(self.canonical_name(name));
                self.fields(name)?
            }
            JoinTarget::Fields(fields) => fields.clone(),
        };

        let related = self.related_data(&fields, &skip).sources;
        let Some((base_source, base_fields)) = related.first() else {
            return Ok(JoinPlan {
                unresolved: fields.clone(),
                fields,
                base: None,
                steps: Vec::new(),
            });
        };

        let mut acquired: Vec<String> = base_fields.clone();
        let mut needed: Vec<String> = fields
            .iter()
            .filter(|f| !acquired.contains(*f))
            .cloned()
            .collect();
        let mut steps = Vec::new();

        let mut progress = true;
        while !needed.is_empty() && progress {
            progress = false;
            for (source, provided) in &related[1..] {
                let key: Vec<String> = provided
                    .iter()
                    .filter(|f| acquired.contains(*f))
                    .cloned()
                    .collect();
                let adds = provided.iter().any(|f| needed.contains(f));
                if key.is_empty() || !adds || !self.can_generate_inner(source, vars, trail)? {
                    continue;
                }

                let mut columns = key.clone();
                columns.extend(provided.iter().filter(|f| !acquired.contains(*f)).cloned());
                log::debug!("Join step {} on {:?}", source, key);
                steps.push(JoinStep {
                    source: source.clone(),
                    key,
                    columns,
                });
                for field in provided {
                    if !acquired.contains(field) {
                        acquired.push(field.clone());
                    }
                }
                needed.retain(|f| !provided.contains(f));
                progress = true;
            }
        }

        Ok(JoinPlan {
            base: Some(JoinSource {
                source: base_source.clone(),
                columns: base_fields.clone(),
            }),
            steps,
            unresolved: needed,
            fields,
        })
    }

    /// Assemble `target` by executing its join plan
    ///
    /// Returns the table, reindexed to the requested fields, and the fields no
    /// source provided.
    ///
    /// # Errors
    /// * `EngineError::NoRecipeFound` if no source provides any field, or a
    ///   source cannot be produced
    pub fn autogen(
        &self,
        target: &JoinTarget,
        how: JoinKind,
        skip: &[String],
    ) -> EngineResult<(Table, Vec<String>)> {
        self.autogen_inner(target, how, skip, &Bindings::new(), &mut Trail::default())
    }

    pub(crate) fn autogen_inner(
        &self,
        target: &JoinTarget,
        how: JoinKind,
        skip: &[String],
        vars: &Bindings,
        trail: &mut Trail,
    ) -> EngineResult<(Table, Vec<String>)> {
        let plan = self.autogen_scheme_inner(target, skip, vars, trail)?;
        let base = plan.base.ok_or_else(|| EngineError::NoRecipeFound {
            target: target.describe(),
            recipes: self.recipes.describe(),
        })?;

        log::info!("Base: {}", base.source);
        let loaded = self.load_inner(&base.source, vars, true, trail)?;
        let mut table = as_table(&base.source, loaded)?.project(&base.columns)?;
        for step in &plan.steps {
            log::info!("Joining: {}", step.source);
            let loaded = self.load_inner(&step.source, vars, true, trail)?;
            let right = as_table(&step.source, loaded)?.project(&step.columns)?;
            table = table.join(&right, &step.key, how)?;
        }
        Ok((table.reindex(&plan.fields), plan.unresolved))
    }

    /// Table of the requested fields, assembled by inner joins
    pub fn view<S: AsRef<str>>(&self, fields: &[S]) -> EngineResult<Table> {
        let target = JoinTarget::fields(fields.iter().map(|f| f.as_ref().to_string()));
        Ok(self.autogen(&target, JoinKind::Inner, &[])?.0)
    }

    /// Rows of `view(fields)` matching `predicate`, optionally narrowed to
    /// `keep`
    pub fn filter<S, K, F>(&self, fields: &[S], predicate: F, keep: &[K]) -> EngineResult<Table>
    where
        S: AsRef<str>,
        K: AsRef<str>,
        F: Fn(&RowRef<'_>) -> bool,
    {
        let table = self.view(fields)?.filter(predicate);
        if keep.is_empty() {
            return Ok(table);
        }
        Ok(table.project(keep)?)
    }

    fn canonical_name(&self, name: &str) -> String {
        self.catalog
            .resolve(name)
            .map(|(entry, _)| entry.path().to_string())
            .unwrap_or_else(|| name.to_string())
    }
}

/// A single table from a load result; multi-match collections are stacked
fn as_table(dataset: &str, data: Data) -> EngineResult<Table> {
    match data {
        Data::Table(table) => Ok(table),
        Data::Collection(_) => Ok(Table::concat(data.tables())),
        other => Err(EngineError::NotATable {
            dataset: dataset.to_string(),
            kind: other.kind().to_string(),
        }),
    }
}
