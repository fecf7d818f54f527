//! Browse session
//!
//! Ties a configuration, its field registry and a [`SelectionEngine`]
//! together, and translates UI interactions into engine mutations.

use serde::Serialize;
use tracing::{debug, info};

use crate::codec::Chip;
use crate::config::{BeaverdamConfig, PlotKind};
use crate::criteria::Criterion;
use crate::engine::SelectionEngine;
use crate::error::{RegistryError, Result};
use crate::registry::{FieldRegistry, FieldSelector, Projection};
use crate::store::DocumentStore;
use crate::table::{ChartPoint, ProjectedRow, ResultTable};
use crate::value::Primitive;

/// One UI interaction
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A checklist's ticked options changed
    ChecklistChanged {
        field: String,
        selected: Vec<Primitive>,
    },
    /// A pie slice or bar was clicked
    CategoryClicked { field: String, value: Primitive },
    /// Points were lasso/box selected on a scatter or box chart
    PointsSelected { ids: Vec<String> },
    /// A chip's remove button was pressed
    ChipRemoved { token: String },
    /// The reset button was pressed
    Reset,
}

/// Checklist state for one filter heading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistView {
    pub field: String,
    /// Every value present in the column
    pub options: Vec<Primitive>,
    /// Values currently allowed by the filter
    pub selected: Vec<Primitive>,
}

/// Data backing one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartData {
    /// Visible-row counts per value (pie, bar)
    Categories(Vec<(Primitive, usize)>),
    /// Visible rows as points (scatter, box)
    Points(Vec<ChartPoint>),
}

/// One chart ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub id: String,
    pub kind: PlotKind,
    pub fields: Vec<String>,
    pub data: ChartData,
}

/// A loaded configuration plus its filtering state
#[derive(Debug, Clone)]
pub struct BrowseSession {
    config: BeaverdamConfig,
    registry: FieldRegistry,
    projection: Projection,
    engine: SelectionEngine,
}

impl BrowseSession {
    /// Register the configured fields, query the store and start with an
    /// empty filter.
    pub fn open(config: BeaverdamConfig, store: &dyn DocumentStore) -> Result<Self> {
        let registry = config.registry()?;
        let projection = registry.projection(FieldSelector::All)?;
        let table = load_table(store, &projection)?;
        info!(
            fields = registry.len(),
            rows = table.len(),
            "opened browse session"
        );
        Ok(Self {
            config,
            registry,
            projection,
            engine: SelectionEngine::new(table),
        })
    }

    /// Re-query the store, keeping the current criteria.
    pub fn reload(&mut self, store: &dyn DocumentStore) -> Result<()> {
        let table = load_table(store, &self.projection)?;
        info!(rows = table.len(), "reloaded documents");
        self.engine.replace_table(table);
        Ok(())
    }

    pub fn config(&self) -> &BeaverdamConfig {
        &self.config
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    pub fn table(&self) -> &ResultTable {
        self.engine.table()
    }

    pub fn visible_rows(&self) -> Vec<&ProjectedRow> {
        self.engine.visible_rows()
    }

    pub fn chips(&self) -> Vec<Chip> {
        self.engine.chips()
    }

    /// Apply one UI interaction.
    ///
    /// Field names are checked against the registry before the engine is
    /// touched, so a rejected event leaves the filter unchanged.
    pub fn handle(&mut self, event: SessionEvent) -> Result<()> {
        debug!(?event, "handling session event");
        match event {
            SessionEvent::ChecklistChanged { field, selected } => {
                self.check_field(&field)?;
                self.engine.undo_row_selection();
                self.engine.update_filter([Criterion::field(field, selected)]);
            }
            SessionEvent::CategoryClicked { field, value } => {
                self.check_field(&field)?;
                self.engine.update_filter([Criterion::field(field, [value])]);
            }
            SessionEvent::PointsSelected { ids } => self.engine.select_rows(ids),
            SessionEvent::ChipRemoved { token } => self.engine.remove_chip(&token)?,
            SessionEvent::Reset => self.engine.clear_filter(),
        }
        Ok(())
    }

    /// One checklist per configured filter heading
    pub fn checklists(&self) -> Vec<ChecklistView> {
        let table = self.engine.table();
        let criteria = self.engine.criteria();
        self.config
            .filters
            .headings
            .iter()
            .map(|field| ChecklistView {
                field: field.clone(),
                options: table.distinct_values(field),
                selected: criteria.field_values(field).unwrap_or_default().to_vec(),
            })
            .collect()
    }

    /// One chart per configured plot, over the visible rows
    pub fn charts(&self) -> Vec<ChartView> {
        let table = self.engine.table();
        self.config
            .plots
            .iter()
            .map(|plot| {
                let fields: Vec<&str> = plot.data_fields.iter().map(String::as_str).collect();
                let data = match fields.as_slice() {
                    [field] if plot.kind.is_categorical() => {
                        ChartData::Categories(table.value_counts(field))
                    }
                    _ => ChartData::Points(table.points(&fields)),
                };
                ChartView {
                    id: plot.id.clone(),
                    kind: plot.kind,
                    fields: plot.data_fields.clone(),
                    data,
                }
            })
            .collect()
    }

    fn check_field(&self, field: &str) -> Result<()> {
        if self.registry.contains_name(field) {
            Ok(())
        } else {
            Err(RegistryError::UnknownField(field.to_string()).into())
        }
    }
}

fn load_table(store: &dyn DocumentStore, projection: &Projection) -> Result<ResultTable> {
    let documents = store.query(&projection.paths())?;
    Ok(ResultTable::from_query(documents, projection))
}
