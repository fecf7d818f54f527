//! Filter criteria
//!
//! A criterion either constrains a column to a set of allowed values or
//! restricts the table to directly selected rows. Criteria combine with AND;
//! a criterion with no values is unconstrained.

use serde::{Deserialize, Serialize};

use crate::value::Primitive;

/// Key under which a row selection appears in map-shaped criteria
pub const ROW_INDEX_KEY: &str = "row_index";

/// A single filter criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// The row's value for `field` must be one of `values`
    Field {
        field: String,
        values: Vec<Primitive>,
    },
    /// The row's id must be one of these
    RowSelection(Vec<String>),
}

impl Criterion {
    /// A field criterion; duplicate values are dropped, order kept.
    pub fn field(field: impl Into<String>, values: impl IntoIterator<Item = Primitive>) -> Self {
        let mut unique: Vec<Primitive> = Vec::new();
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Criterion::Field {
            field: field.into(),
            values: unique,
        }
    }

    /// A row selection; duplicate ids are dropped, order kept.
    pub fn rows<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for id in ids {
            let id = id.into();
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Criterion::RowSelection(unique)
    }

    /// Build a criterion from a map-shaped `(key, values)` entry.
    ///
    /// The reserved `row_index` key becomes a row selection of the values'
    /// labels.
    pub fn from_entry(key: &str, values: Vec<Primitive>) -> Self {
        if key == ROW_INDEX_KEY {
            Criterion::rows(values.iter().map(|v| v.to_string()))
        } else {
            Criterion::field(key, values)
        }
    }

    /// The map key this criterion occupies
    pub fn key(&self) -> &str {
        match self {
            Criterion::Field { field, .. } => field,
            Criterion::RowSelection(_) => ROW_INDEX_KEY,
        }
    }

    /// Whether this criterion lets every row through
    pub fn is_unconstrained(&self) -> bool {
        match self {
            Criterion::Field { values, .. } => values.is_empty(),
            Criterion::RowSelection(ids) => ids.is_empty(),
        }
    }
}

/// The active filter: at most one criterion per key, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    entries: Vec<Criterion>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`upsert`](Self::upsert) for a field criterion
    pub fn with_field(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = Primitive>,
    ) -> Self {
        self.upsert(Criterion::field(field, values));
        self
    }

    /// Builder form of [`upsert`](Self::upsert) for a row selection
    pub fn with_rows<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.upsert(Criterion::rows(ids));
        self
    }

    /// Insert a criterion, overwriting any existing criterion with the same
    /// key in place.
    pub fn upsert(&mut self, criterion: Criterion) {
        match self.entries.iter_mut().find(|c| c.key() == criterion.key()) {
            Some(existing) => *existing = criterion,
            None => self.entries.push(criterion),
        }
    }

    /// Remove the criterion stored under `key`
    pub fn remove(&mut self, key: &str) -> Option<Criterion> {
        let index = self.entries.iter().position(|c| c.key() == key)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, key: &str) -> Option<&Criterion> {
        self.entries.iter().find(|c| c.key() == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Allowed values for a field, if the field has a criterion
    pub fn field_values(&self, field: &str) -> Option<&[Primitive]> {
        self.entries.iter().find_map(|c| match c {
            Criterion::Field { field: f, values } if f == field => Some(values.as_slice()),
            _ => None,
        })
    }

    /// Selected row ids, if a row selection is present
    pub fn row_selection(&self) -> Option<&[String]> {
        self.entries.iter().find_map(|c| match c {
            Criterion::RowSelection(ids) => Some(ids.as_slice()),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when no criterion restricts anything
    pub fn is_unconstrained(&self) -> bool {
        self.entries.iter().all(Criterion::is_unconstrained)
    }

    /// Every allowed value across all criteria, flattened in order.
    /// Row ids appear as string values.
    pub fn all_values(&self) -> Vec<Primitive> {
        self.entries
            .iter()
            .flat_map(|c| match c {
                Criterion::Field { values, .. } => values.clone(),
                Criterion::RowSelection(ids) => {
                    ids.iter().map(|id| Primitive::String(id.clone())).collect()
                }
            })
            .collect()
    }
}

impl FromIterator<Criterion> for FilterCriteria {
    fn from_iter<I: IntoIterator<Item = Criterion>>(iter: I) -> Self {
        let mut criteria = Self::new();
        for criterion in iter {
            criteria.upsert(criterion);
        }
        criteria
    }
}

impl<K: AsRef<str>> FromIterator<(K, Vec<Primitive>)> for FilterCriteria {
    fn from_iter<I: IntoIterator<Item = (K, Vec<Primitive>)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(key, values)| Criterion::from_entry(key.as_ref(), values))
            .collect()
    }
}
