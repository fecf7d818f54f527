//! TOML configuration
//!
//! ```toml
//! [database]
//! type = "json"
//! location = "metadata.json"
//!
//! [fields]
//! genre = "info.music.genre"
//! performers = "info.performers"
//!
//! [filters]
//! headings = ["genre"]
//!
//! [plots.genre_pie]
//! data_field = "genre"
//! plot_type = "pie"
//! ```
//!
//! `[database]` and `[fields]` are required. `[fields]` keeps file order,
//! which is the field registration order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, RegistryError};
use crate::registry::FieldRegistry;

/// Where documents are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// A single JSON file in table layout
    Json { location: PathBuf },
}

/// Checklist settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// One checklist per display name
    #[serde(default)]
    pub headings: Vec<String>,
}

/// Chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    Pie,
    Bar,
    Scatter,
    Box,
}

impl PlotKind {
    /// Number of data fields the chart plots
    pub fn field_count(&self) -> usize {
        match self {
            PlotKind::Pie | PlotKind::Bar => 1,
            PlotKind::Scatter | PlotKind::Box => 2,
        }
    }

    /// Whether clicking the chart selects a category rather than points
    pub fn is_categorical(&self) -> bool {
        self.field_count() == 1
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FieldList {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawPlot {
    data_field: FieldList,
    plot_type: PlotKind,
}

/// One configured chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotConfig {
    /// Key of the `[plots.<id>]` table
    pub id: String,
    /// Display names plotted, in axis order
    pub data_fields: Vec<String>,
    pub kind: PlotKind,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    database: Option<DatabaseConfig>,
    fields: Option<toml::Table>,
    #[serde(default)]
    filters: FiltersConfig,
    #[serde(default)]
    plots: toml::Table,
}

/// Parsed configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct BeaverdamConfig {
    pub database: DatabaseConfig,
    /// `(display_name, dotted_path)` in file order
    pub fields: Vec<(String, String)>,
    pub filters: FiltersConfig,
    pub plots: Vec<PlotConfig>,
    base_dir: Option<PathBuf>,
}

impl BeaverdamConfig {
    /// Read and validate a configuration file.
    ///
    /// Relative database locations resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut missing = Vec::new();
        if raw.database.is_none() {
            missing.push("database");
        }
        if raw.fields.is_none() {
            missing.push("fields");
        }
        let (Some(database), Some(raw_fields)) = (raw.database, raw.fields) else {
            return Err(ConfigError::MissingSection(missing.join(", ")));
        };

        let fields = raw_fields
            .into_iter()
            .map(|(name, path)| match path {
                toml::Value::String(path) => Ok((name, path)),
                _ => Err(ConfigError::InvalidField(name)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let plots = raw
            .plots
            .into_iter()
            .map(|(id, value)| {
                let plot: RawPlot = value
                    .try_into()
                    .map_err(|e: toml::de::Error| ConfigError::Parse(format!("plots.{}: {}", id, e)))?;
                let data_fields = match plot.data_field {
                    FieldList::One(field) => vec![field],
                    FieldList::Many(fields) => fields,
                };
                Ok(PlotConfig {
                    id,
                    data_fields,
                    kind: plot.plot_type,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let config = Self {
            database,
            fields,
            filters: raw.filters,
            plots,
            base_dir: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that filters and plots only reference configured fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let known = |field: &str| self.fields.iter().any(|(name, _)| name == field);

        if let Some(field) = self.filters.headings.iter().find(|h| !known(h)) {
            return Err(ConfigError::UnknownField {
                section: "filters".into(),
                field: field.clone(),
            });
        }

        for plot in &self.plots {
            if plot.data_fields.len() != plot.kind.field_count() {
                return Err(ConfigError::InvalidPlot {
                    id: plot.id.clone(),
                    message: format!(
                        "{:?} plots take {} data field(s), got {}",
                        plot.kind,
                        plot.kind.field_count(),
                        plot.data_fields.len()
                    ),
                });
            }
            if let Some(field) = plot.data_fields.iter().find(|f| !known(f)) {
                return Err(ConfigError::UnknownField {
                    section: format!("plots.{}", plot.id),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }

    /// Build the field registry in file order.
    pub fn registry(&self) -> Result<FieldRegistry, RegistryError> {
        FieldRegistry::from_pairs(self.fields.iter().map(|(n, p)| (n.as_str(), p.as_str())))
    }

    /// Database file location, resolved against the config file directory
    pub fn database_location(&self) -> PathBuf {
        let DatabaseConfig::Json { location } = &self.database;
        match &self.base_dir {
            Some(dir) if location.is_relative() => dir.join(location),
            _ => location.clone(),
        }
    }
}
