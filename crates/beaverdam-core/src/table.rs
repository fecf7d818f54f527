//! Projected result table
//!
//! One row per document, one column per requested display name, plus a
//! per-row selection state. The selection state is owned by the table but
//! only ever written by [`SelectionEngine`](crate::engine::SelectionEngine)
//! when it recomputes the filter.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::path::extract;
use crate::registry::Projection;
use crate::value::{DocValue, Primitive, Value};

/// Name of the reserved selection-state column
pub const SELECTION_STATE_COLUMN: &str = "selectionState";

/// One document projected onto the table's columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRow {
    /// Stable document identifier
    pub id: String,
    /// Projected values keyed by display name
    pub fields: BTreeMap<String, DocValue>,
}

impl ProjectedRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field value
    pub fn with_field(mut self, name: impl Into<String>, value: DocValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Value of a field; absent columns read as `Missing`.
    pub fn get(&self, field: &str) -> &DocValue {
        self.fields.get(field).unwrap_or(&DocValue::Missing)
    }

    /// Project a document onto the given columns.
    pub fn project(
        id: impl Into<String>,
        document: &Value,
        projection: &Projection,
    ) -> Self {
        let mut row = Self::new(id);
        for (name, path) in projection.iter() {
            row.fields.insert(name.to_string(), extract(document, path));
        }
        row
    }
}

/// A scatter/box chart point, carrying the row id so a point selection can
/// be fed back as a row selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub id: String,
    pub values: Vec<DocValue>,
}

/// Ordered table of projected rows with a per-row selection state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<ProjectedRow>,
    selection: Vec<bool>,
}

impl ResultTable {
    /// Create an empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            selection: Vec::new(),
        }
    }

    /// Build a table from query results.
    ///
    /// Rows keep the iteration order of `documents`; a repeated id replaces
    /// the earlier row in place. Documents of differing shapes are
    /// expected: a column a document cannot fill reads as `Missing`.
    pub fn from_query<I>(documents: I, projection: &Projection) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut table = Self::new(projection.names());
        for (id, document) in documents {
            table.upsert(ProjectedRow::project(id, &document, projection));
        }
        table
    }

    /// Insert a row, or replace the row with the same id.
    ///
    /// The row starts out selected.
    pub fn upsert(&mut self, row: ProjectedRow) {
        match self.position(&row.id) {
            Some(index) => {
                self.rows[index] = row;
                self.selection[index] = true;
            }
            None => {
                self.rows.push(row);
                self.selection.push(true);
            }
        }
    }

    /// Column names, excluding the selection state
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// All rows in order, selected or not
    pub fn rows(&self) -> &[ProjectedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a row by document id
    pub fn get(&self, id: &str) -> Option<&ProjectedRow> {
        self.position(id).map(|i| &self.rows[i])
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// The selection-state column, aligned with [`rows`](Self::rows)
    pub fn selection_state(&self) -> &[bool] {
        &self.selection
    }

    pub(crate) fn set_selection_state(&mut self, selection: Vec<bool>) {
        debug_assert_eq!(selection.len(), self.rows.len());
        self.selection = selection;
    }

    /// Rows whose selection state is true, in table order
    pub fn visible_rows(&self) -> Vec<&ProjectedRow> {
        self.visible().collect()
    }

    fn visible(&self) -> impl Iterator<Item = &ProjectedRow> {
        self.rows
            .iter()
            .zip(&self.selection)
            .filter_map(|(row, &selected)| selected.then_some(row))
    }

    /// Number of currently visible rows
    pub fn visible_count(&self) -> usize {
        self.selection.iter().filter(|&&s| s).count()
    }

    /// Every distinct non-null value of a column across all rows, in
    /// first-seen order. List cells contribute each element.
    pub fn distinct_values(&self, field: &str) -> Vec<Primitive> {
        let mut seen: Vec<Primitive> = Vec::new();
        for row in &self.rows {
            for value in row.get(field).primitives() {
                if !value.is_null() && !seen.contains(value) {
                    seen.push(value.clone());
                }
            }
        }
        seen
    }

    /// How many visible rows hold each value of a column, in first-seen
    /// order. List cells count once per element.
    pub fn value_counts(&self, field: &str) -> Vec<(Primitive, usize)> {
        let mut counts: Vec<(Primitive, usize)> = Vec::new();
        for row in self.visible() {
            for value in row.get(field).primitives() {
                if value.is_null() {
                    continue;
                }
                match counts.iter_mut().find(|(v, _)| v == value) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((value.clone(), 1)),
                }
            }
        }
        counts
    }

    /// Visible rows as chart points over the given columns
    pub fn points(&self, fields: &[&str]) -> Vec<ChartPoint> {
        self.visible()
            .map(|row| ChartPoint {
                id: row.id.clone(),
                values: fields.iter().map(|f| row.get(f).clone()).collect(),
            })
            .collect()
    }
}
