//! Error types for beaverdam-core
//!
//! Absent or nested document values are not errors: they surface as
//! [`DocValue::Missing`](crate::value::DocValue::Missing). The errors here
//! cover configuration mistakes (unregistered or reserved names) and
//! malformed chip tokens.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;

/// Result type alias for beaverdam operations
pub type Result<T> = std::result::Result<T, BeaverdamError>;

/// Main error type for beaverdam operations
#[derive(Error, Debug)]
pub enum BeaverdamError {
    /// Field registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Chip token errors
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the field registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A display name or path that was never registered
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A display name registered twice
    #[error("Field already registered: {0}")]
    DuplicateField(String),

    /// A display name the table or the filter uses for itself
    #[error("Field name is reserved: {0}")]
    ReservedField(String),
}

/// Errors from decoding chip tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The declared value kind is not one of str, int, float, bool
    #[error("Unsupported value type: {0}")]
    UnsupportedType(String),

    /// The token does not have the CRITERION/VALUE/TYPE layout
    #[error("Malformed criterion token: {0}")]
    MalformedToken(String),

    /// The value label does not parse as its declared kind
    #[error("Invalid {kind} value: {value}")]
    InvalidValue { kind: String, value: String },
}

/// Errors from loading or validating a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("Cannot read config file {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// File is not valid TOML or does not match the expected layout
    #[error("Cannot parse config: {0}")]
    Parse(String),

    /// A required section is absent
    #[error("Config file is missing requested section(s): {0}")]
    MissingSection(String),

    /// A `[fields]` entry whose path is not a string
    #[error("Field '{0}' must map to a dotted path string")]
    InvalidField(String),

    /// A filter heading or plot references an unregistered field
    #[error("Config references unknown field '{field}' in [{section}]")]
    UnknownField { section: String, field: String },

    /// A plot with the wrong number of data fields for its kind
    #[error("Plot '{id}': {message}")]
    InvalidPlot { id: String, message: String },
}
