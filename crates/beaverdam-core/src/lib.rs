//! beaverdam-core - Field projection and selection engine for metadata documents
//!
//! This crate provides the core of beaverdam, a browser for collections of
//! nested metadata documents (one JSON document per experimental session,
//! recording, or similar).
//!
//! # Key Components
//!
//! - **FieldRegistry**: Display names mapped to dotted document paths
//! - **extract**: Projects one path of a nested document to a scalar or list
//! - **ResultTable**: Projected rows plus a per-row selection state
//! - **SelectionEngine**: Filter criteria kept in sync with the selection state
//! - **codec**: Chip tokens that encode one applied criterion value
//! - **BrowseSession**: Configuration, registry and engine behind one UI
//!
//! # Filtering
//!
//! A row is visible when it passes every constrained criterion. A field
//! criterion passes when the row's value (or any element of a list value)
//! is among the allowed values; a row selection passes when the row id is
//! listed. An empty value list constrains nothing.

pub mod codec;
pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod path;
pub mod registry;
pub mod session;
pub mod store;
pub mod table;
pub mod value;

pub use codec::{Chip, DecodedCriterion, ValueType, MANUAL_SELECTION_LABEL};
pub use config::*;
pub use criteria::*;
pub use engine::*;
pub use error::{BeaverdamError, CodecError, ConfigError, RegistryError, Result};
pub use path::*;
pub use registry::*;
pub use session::*;
pub use store::*;
pub use table::*;
pub use value::*;
