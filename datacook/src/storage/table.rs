// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Row-oriented in-memory table
//!
//! This is the minimal tabular representation the engine needs for schema
//! enforcement (reindex + cast), the built-in quick recipes (concat, merge,
//! group-by) and join-plan execution. Recipes are free to do heavier compute
//! elsewhere and hand back a `Table`.

use super::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Row has {found} values, table has {expected} columns")]
    RowWidth { expected: usize, found: usize },

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
}

pub type TableResult<T> = Result<T, TableError>;

/// How two tables are combined by [`Table::join`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Outer,
}

impl std::str::FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "outer" | "full" => Ok(JoinKind::Outer),
            _ => Err(format!(
                "Unknown join kind: {}. Valid options: inner, left, right, outer",
                s
            )),
        }
    }
}

/// Borrowed view of one row
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from rows, checking every row's width
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> TableResult<Self> {
        let mut table = Self::new(columns);
        let mut seen = HashSet::new();
        for column in &table.columns {
            if !seen.insert(column.as_str()) {
                return Err(TableError::DuplicateColumn(column.clone()));
            }
        }
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> TableResult<()> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> TableResult<Vec<&Value>> {
        let idx = self.require(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |values| RowRef {
            columns: &self.columns,
            values,
        })
    }

    /// Conform to `columns`: reorder, drop extras, add missing ones as nulls
    pub fn reindex<S: AsRef<str>>(&self, columns: &[S]) -> Table {
        let sources: Vec<Option<usize>> = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|src| src.map(|idx| row[idx].clone()).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Table {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows,
        }
    }

    /// Select existing columns in the given order
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> TableResult<Table> {
        for column in columns {
            self.require(column.as_ref())?;
        }
        Ok(self.reindex(columns))
    }

    /// Replace every value of one column
    pub fn map_column<F, E>(&mut self, name: &str, mut f: F) -> Result<(), E>
    where
        F: FnMut(&Value) -> Result<Value, E>,
        E: From<TableError>,
    {
        let idx = self.require(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx])?;
        }
        Ok(())
    }

    /// Keep the rows matching `predicate`
    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(&RowRef<'_>) -> bool,
    {
        let rows = self
            .iter_rows()
            .filter(|row| predicate(row))
            .map(|row| row.values.to_vec())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Stack tables vertically; columns are the union in first-seen order
    pub fn concat<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Table {
        let tables: Vec<&Table> = tables.into_iter().collect();
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }
        let mut out = Table::new(columns.clone());
        for table in tables {
            out.rows.extend(table.reindex(&columns).rows);
        }
        out
    }

    /// Hash join on `on`
    ///
    /// Output columns are this table's columns followed by the other table's
    /// non-key columns; a clashing non-key column from `other` is suffixed
    /// with `_right`. Left rows keep their order; unmatched rows from `other`
    /// (right/outer joins) are appended in their original order.
    pub fn join<S: AsRef<str>>(&self, other: &Table, on: &[S], how: JoinKind) -> TableResult<Table> {
        let left_keys: Vec<usize> = on
            .iter()
            .map(|c| self.require(c.as_ref()))
            .collect::<TableResult<_>>()?;
        let right_keys: Vec<usize> = on
            .iter()
            .map(|c| other.require(c.as_ref()))
            .collect::<TableResult<_>>()?;

        let right_payload: Vec<usize> = (0..other.columns.len())
            .filter(|idx| !right_keys.contains(idx))
            .collect();

        let mut columns = self.columns.clone();
        for &idx in &right_payload {
            let name = &other.columns[idx];
            if columns.contains(name) {
                columns.push(format!("{}_right", name));
            } else {
                columns.push(name.clone());
            }
        }

        let mut index: HashMap<Vec<&Value>, Vec<usize>> = HashMap::new();
        for (pos, row) in other.rows.iter().enumerate() {
            let key: Vec<&Value> = right_keys.iter().map(|&k| &row[k]).collect();
            index.entry(key).or_default().push(pos);
        }

        let mut matched_right = vec![false; other.rows.len()];
        let mut rows = Vec::new();
        for row in &self.rows {
            let key: Vec<&Value> = left_keys.iter().map(|&k| &row[k]).collect();
            match index.get(&key) {
                Some(hits) => {
                    for &pos in hits {
                        matched_right[pos] = true;
                        let mut combined = row.clone();
                        combined.extend(right_payload.iter().map(|&i| other.rows[pos][i].clone()));
                        rows.push(combined);
                    }
                }
                None if matches!(how, JoinKind::Left | JoinKind::Outer) => {
                    let mut combined = row.clone();
                    combined.extend(right_payload.iter().map(|_| Value::Null));
                    rows.push(combined);
                }
                None => {}
            }
        }

        if matches!(how, JoinKind::Right | JoinKind::Outer) {
            for (pos, right_row) in other.rows.iter().enumerate() {
                if matched_right[pos] {
                    continue;
                }
                let mut combined = vec![Value::Null; self.columns.len()];
                for (&l, &r) in left_keys.iter().zip(&right_keys) {
                    combined[l] = right_row[r].clone();
                }
                combined.extend(right_payload.iter().map(|&i| right_row[i].clone()));
                rows.push(combined);
            }
        }

        Ok(Table { columns, rows })
    }

    /// Split into one table per distinct value of `field`, ordered by key
    pub fn group_by(&self, field: &str) -> TableResult<Vec<(Value, Table)>> {
        let idx = self.require(field)?;
        let mut groups: BTreeMap<Value, Vec<Vec<Value>>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(row[idx].clone()).or_default().push(row.clone());
        }
        Ok(groups
            .into_iter()
            .map(|(key, rows)| {
                (
                    key,
                    Table {
                        columns: self.columns.clone(),
                        rows,
                    },
                )
            })
            .collect())
    }

    fn require(&self, name: &str) -> TableResult<usize> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        Table::from_rows(
            ["id", "name"],
            vec![
                vec![1.into(), "ann".into()],
                vec![2.into(), "bob".into()],
                vec![3.into(), "cy".into()],
            ],
        )
        .unwrap()
    }

    fn scores() -> Table {
        Table::from_rows(
            ["id", "score"],
            vec![vec![1.into(), 9.5.into()], vec![3.into(), 7.0.into()], vec![4.into(), 1.0.into()]],
        )
        .unwrap()
    }

    #[test]
    fn test_reindex_reorders_and_fills() {
        let t = people().reindex(&["name", "missing", "id"]);
        assert_eq!(t.columns(), &["name", "missing", "id"]);
        assert_eq!(t.rows()[0], vec!["ann".into(), Value::Null, 1.into()]);
    }

    #[test]
    fn test_project_requires_columns() {
        assert!(people().project(&["name"]).is_ok());
        assert_eq!(
            people().project(&["nope"]).unwrap_err(),
            TableError::MissingColumn("nope".into())
        );
    }

    #[test]
    fn test_inner_join() {
        let joined = people().join(&scores(), &["id"], JoinKind::Inner).unwrap();
        assert_eq!(joined.columns(), &["id", "name", "score"]);
        assert_eq!(joined.num_rows(), 2);
        assert_eq!(joined.get(1, "name"), Some(&Value::String("cy".into())));
    }

    #[test]
    fn test_outer_join_keeps_both_sides() {
        let joined = people().join(&scores(), &["id"], JoinKind::Outer).unwrap();
        assert_eq!(joined.num_rows(), 4);
        assert_eq!(joined.get(1, "score"), Some(&Value::Null));
        assert_eq!(joined.get(3, "id"), Some(&Value::Integer(4)));
        assert_eq!(joined.get(3, "name"), Some(&Value::Null));
    }

    #[test]
    fn test_concat_unions_columns() {
        let t = Table::concat([&people(), &scores()]);
        assert_eq!(t.columns(), &["id", "name", "score"]);
        assert_eq!(t.num_rows(), 6);
        assert_eq!(t.get(0, "score"), Some(&Value::Null));
    }

    #[test]
    fn test_group_by_sorted_keys() {
        let t = Table::from_rows(
            ["k", "v"],
            vec![
                vec!["b".into(), 1.into()],
                vec!["a".into(), 2.into()],
                vec!["b".into(), 3.into()],
            ],
        )
        .unwrap();
        let groups = t.group_by("k").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Value::String("a".into()));
        assert_eq!(groups[1].1.num_rows(), 2);
    }

    #[test]
    fn test_join_matches_signed_zero_keys() {
        let left = Table::from_rows(["k", "l"], vec![vec![0.0.into(), "x".into()]]).unwrap();
        let right = Table::from_rows(["k", "r"], vec![vec![(-0.0).into(), "y".into()]]).unwrap();
        let joined = left.join(&right, &["k"], JoinKind::Inner).unwrap();
        assert_eq!(joined.num_rows(), 1);
        assert_eq!(joined.get(0, "r"), Some(&Value::String("y".into())));
    }

    #[test]
    fn test_group_by_keeps_int_and_float_apart() {
        let t = Table::from_rows(
            ["k", "v"],
            vec![
                vec![Value::Float(1.0), 1.into()],
                vec![Value::Integer(1), 2.into()],
                vec![Value::Float(1.0), 3.into()],
            ],
        )
        .unwrap();
        let groups = t.group_by("k").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Value::Integer(1));
        assert_eq!(groups[0].1.num_rows(), 1);
        assert_eq!(groups[1].0, Value::Float(1.0));
        assert_eq!(groups[1].1.num_rows(), 2);
    }

    #[test]
    fn test_row_width_is_checked() {
        let err = Table::from_rows(["a", "b"], vec![vec![1.into()]]).unwrap_err();
        assert_eq!(err, TableError::RowWidth { expected: 2, found: 1 });
    }
}
