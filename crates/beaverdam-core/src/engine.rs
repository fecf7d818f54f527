//! Selection engine
//!
//! Owns the result table and the active [`FilterCriteria`], and keeps the
//! table's selection state equal to the criteria evaluated against the
//! table contents. Every mutator recomputes the selection before returning.
//!
//! Criteria that name a column the table does not have are not errors: no
//! row can satisfy them, so every row fails that criterion. Callers that
//! want stale names rejected should validate them against the
//! [`FieldRegistry`](crate::registry::FieldRegistry) first, as
//! [`BrowseSession`](crate::session::BrowseSession) does.

use tracing::{debug, warn};

use crate::codec::{self, Chip, MANUAL_SELECTION_LABEL};
use crate::criteria::{Criterion, FilterCriteria, ROW_INDEX_KEY};
use crate::error::CodecError;
use crate::table::{ProjectedRow, ResultTable};
use crate::value::Primitive;

/// Filtering state machine over a [`ResultTable`]
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    table: ResultTable,
    criteria: FilterCriteria,
}

impl SelectionEngine {
    /// Wrap a table with an empty filter
    pub fn new(table: ResultTable) -> Self {
        let mut engine = Self {
            table,
            criteria: FilterCriteria::new(),
        };
        engine.apply_filter();
        engine
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Swap in a freshly queried table, keeping the current criteria.
    pub fn replace_table(&mut self, table: ResultTable) {
        self.table = table;
        self.apply_filter();
    }

    /// Replace the criteria wholesale.
    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        debug!(criteria = criteria.len(), "set filter");
        self.criteria = criteria;
        self.apply_filter();
    }

    /// Overwrite the criteria named in `delta`; others keep their values.
    ///
    /// Each entry in `delta` carries the complete new value list for its
    /// key; lists are not merged.
    pub fn update_filter(&mut self, delta: impl IntoIterator<Item = Criterion>) {
        for criterion in delta {
            debug!(key = criterion.key(), "update filter");
            self.criteria.upsert(criterion);
        }
        self.apply_filter();
    }

    /// Remove every criterion; all rows become visible.
    pub fn clear_filter(&mut self) {
        debug!("clear filter");
        self.criteria = FilterCriteria::new();
        self.apply_filter();
    }

    /// Restrict to directly selected rows, in addition to any other criteria.
    pub fn select_rows<S: Into<String>>(&mut self, ids: impl IntoIterator<Item = S>) {
        self.update_filter([Criterion::rows(ids)]);
    }

    /// Drop the row selection, leaving field criteria untouched.
    pub fn undo_row_selection(&mut self) {
        if self.criteria.remove(ROW_INDEX_KEY).is_some() {
            debug!("undo row selection");
        }
        self.apply_filter();
    }

    /// Recompute every row's selection state from the criteria.
    pub fn apply_filter(&mut self) {
        for criterion in self.criteria.iter() {
            if let Criterion::Field { field, values } = criterion {
                if !values.is_empty() && !self.table.has_column(field) {
                    warn!(field = %field, "filter references a column the table does not have");
                }
            }
        }

        let selection: Vec<bool> = self
            .table
            .rows()
            .iter()
            .map(|row| row_passes(row, &self.criteria))
            .collect();
        self.table.set_selection_state(selection);

        debug!(
            rows = self.table.len(),
            visible = self.table.visible_count(),
            "applied filter"
        );
    }

    /// Rows passing every active criterion, in table order
    pub fn visible_rows(&self) -> Vec<&ProjectedRow> {
        self.table.visible_rows()
    }

    /// One chip per applied field value, plus a single chip for a non-empty
    /// row selection.
    pub fn chips(&self) -> Vec<Chip> {
        let mut chips = Vec::new();
        for criterion in self.criteria.iter() {
            match criterion {
                Criterion::Field { field, values } => {
                    chips.extend(values.iter().map(|v| Chip::for_value(field, v)));
                }
                Criterion::RowSelection(ids) if !ids.is_empty() => {
                    chips.push(Chip::for_value(
                        ROW_INDEX_KEY,
                        &Primitive::from(MANUAL_SELECTION_LABEL),
                    ));
                }
                Criterion::RowSelection(_) => {}
            }
        }
        chips
    }

    /// Strike the value a chip stands for from its criterion.
    ///
    /// The manual-selection chip empties the row selection. Removing the
    /// last value of a field leaves that field with an empty (unconstrained)
    /// entry rather than dropping the key.
    pub fn remove_chip(&mut self, token: &str) -> Result<(), CodecError> {
        let decoded = codec::decode(token)?;

        let replacement = match self.criteria.get(&decoded.field) {
            Some(Criterion::RowSelection(_)) => Criterion::RowSelection(Vec::new()),
            Some(Criterion::Field { field, values }) => {
                let mut values = values.clone();
                if let Some(index) = values.iter().position(|v| *v == decoded.value) {
                    values.remove(index);
                }
                Criterion::Field {
                    field: field.clone(),
                    values,
                }
            }
            None => {
                debug!(field = %decoded.field, "chip refers to no active criterion");
                return Ok(());
            }
        };
        self.update_filter([replacement]);
        Ok(())
    }
}

/// AND over all constrained criteria.
fn row_passes(row: &ProjectedRow, criteria: &FilterCriteria) -> bool {
    criteria
        .iter()
        .filter(|c| !c.is_unconstrained())
        .all(|criterion| match criterion {
            Criterion::RowSelection(ids) => ids.contains(&row.id),
            Criterion::Field { field, values } => row.get(field).satisfies(values),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DocValue;

    fn table() -> ResultTable {
        let mut table = ResultTable::new(vec!["genre".into(), "tags".into()]);
        for (id, genre, tags) in [
            ("d1", Some("jazz"), vec!["live"]),
            ("d2", Some("rock"), vec!["studio"]),
            ("d3", Some("jazz"), vec!["live", "studio"]),
            ("d4", None, vec![]),
        ] {
            let genre = genre.map_or(DocValue::Missing, |g| DocValue::Scalar(g.into()));
            let tags = DocValue::List(tags.into_iter().map(Primitive::from).collect());
            table.upsert(
                ProjectedRow::new(id)
                    .with_field("genre", genre)
                    .with_field("tags", tags),
            );
        }
        table
    }

    fn visible_ids(engine: &SelectionEngine) -> Vec<&str> {
        engine.visible_rows().iter().map(|r| r.id.as_str()).collect()
    }

    fn genre(values: &[&str]) -> Criterion {
        Criterion::field("genre", values.iter().map(|v| Primitive::from(*v)))
    }

    #[test]
    fn new_engine_shows_everything() {
        let engine = SelectionEngine::new(table());
        assert_eq!(visible_ids(&engine), ["d1", "d2", "d3", "d4"]);
    }

    #[test]
    fn set_filter_replaces_criteria() {
        let mut engine = SelectionEngine::new(table());
        engine.set_filter(FilterCriteria::new().with_field("tags", [Primitive::from("studio")]));
        engine.set_filter([genre(&["rock"])].into_iter().collect());
        assert!(!engine.criteria().contains_key("tags"));
        assert_eq!(visible_ids(&engine), ["d2"]);
    }

    #[test]
    fn update_filter_overwrites_only_named_fields() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([genre(&["jazz"])]);
        engine.update_filter([Criterion::field("tags", [Primitive::from("studio")])]);
        assert_eq!(visible_ids(&engine), ["d3"]);

        engine.update_filter([genre(&["rock"])]);
        assert_eq!(engine.criteria().field_values("genre").unwrap(), [Primitive::from("rock")]);
        assert_eq!(visible_ids(&engine), ["d2"]);
    }

    #[test]
    fn missing_value_fails_constrained_field() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([genre(&["jazz", "rock"])]);
        assert_eq!(visible_ids(&engine), ["d1", "d2", "d3"]);
    }

    #[test]
    fn empty_values_are_unconstrained() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([genre(&[]), Criterion::rows(Vec::<String>::new())]);
        assert_eq!(engine.table().visible_count(), 4);
    }

    #[test]
    fn unknown_column_matches_nothing() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([Criterion::field("year", [Primitive::Int(1999)])]);
        assert!(engine.visible_rows().is_empty());

        engine.update_filter([Criterion::field("year", Vec::new())]);
        assert_eq!(engine.table().visible_count(), 4);
    }

    #[test]
    fn row_selection_combines_with_fields() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([genre(&["jazz"])]);
        engine.select_rows(["d2", "d3"]);
        assert_eq!(visible_ids(&engine), ["d3"]);

        engine.undo_row_selection();
        assert_eq!(visible_ids(&engine), ["d1", "d3"]);
        assert!(engine.criteria().row_selection().is_none());
    }

    #[test]
    fn replace_table_reapplies_criteria() {
        let mut engine = SelectionEngine::new(ResultTable::default());
        engine.update_filter([genre(&["rock"])]);
        engine.replace_table(table());
        assert_eq!(visible_ids(&engine), ["d2"]);
    }

    #[test]
    fn chips_list_values_and_manual_selection() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([genre(&["jazz", "rock"])]);
        engine.select_rows(["d1"]);
        let labels: Vec<String> = engine.chips().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, ["jazz", "rock", MANUAL_SELECTION_LABEL]);

        engine.update_filter([Criterion::rows(Vec::<String>::new())]);
        assert_eq!(engine.chips().len(), 2);
    }

    #[test]
    fn removing_chip_strikes_one_value() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([genre(&["jazz", "rock"])]);
        let token = codec::encode("genre", &Primitive::from("rock"));
        engine.remove_chip(&token).unwrap();
        assert_eq!(engine.criteria().field_values("genre").unwrap(), [Primitive::from("jazz")]);
        assert_eq!(visible_ids(&engine), ["d1", "d3"]);

        let token = codec::encode("genre", &Primitive::from("jazz"));
        engine.remove_chip(&token).unwrap();
        assert!(engine.criteria().field_values("genre").unwrap().is_empty());
        assert_eq!(engine.table().visible_count(), 4);
    }

    #[test]
    fn removing_field_chip_keeps_row_selection() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([genre(&["jazz", "rock"])]);
        engine.select_rows(["d1", "d2"]);
        let token = codec::encode("genre", &Primitive::from("rock"));
        engine.remove_chip(&token).unwrap();
        assert_eq!(engine.criteria().row_selection().unwrap(), ["d1", "d2"]);
        assert_eq!(visible_ids(&engine), ["d1"]);
    }

    #[test]
    fn removing_manual_selection_chip_empties_rows() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([genre(&["jazz"])]);
        engine.select_rows(["d1"]);
        let chip = engine.chips().pop().unwrap();
        engine.remove_chip(&chip.token).unwrap();
        assert!(engine.criteria().row_selection().unwrap().is_empty());
        assert_eq!(engine.criteria().field_values("genre").unwrap(), [Primitive::from("jazz")]);
        assert_eq!(visible_ids(&engine), ["d1", "d3"]);
    }

    #[test]
    fn removing_bad_chip_fails_without_change() {
        let mut engine = SelectionEngine::new(table());
        engine.update_filter([genre(&["jazz"])]);
        assert!(engine.remove_chip("CRITERION=genre__VALUE=x__TYPE=tuple").is_err());
        assert_eq!(visible_ids(&engine), ["d1", "d3"]);
    }
}
