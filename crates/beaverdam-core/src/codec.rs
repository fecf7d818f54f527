//! Chip tokens
//!
//! A chip shows one currently applied criterion value. Its token encodes
//! the criterion name, the value's label and the value's kind, so removing
//! the chip strikes exactly that value without the caller tracking indices:
//!
//! ```text
//! CRITERION=genre__VALUE=jazz__TYPE=str
//! CRITERION=live__VALUE=True__TYPE=bool
//! ```

use serde::Serialize;
use std::fmt;

use crate::error::CodecError;
use crate::value::Primitive;

const CRITERION_PREFIX: &str = "CRITERION=";
const VALUE_MARKER: &str = "__VALUE=";
const TYPE_MARKER: &str = "__TYPE=";

/// Label of the single chip standing for a direct row selection
pub const MANUAL_SELECTION_LABEL: &str = "manual selection";

/// Value kinds a token can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueType {
    Str,
    Int,
    Float,
    Bool,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
        }
    }

    fn from_name(name: &str) -> Result<Self, CodecError> {
        match name {
            "str" => Ok(ValueType::Str),
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            "bool" => Ok(ValueType::Bool),
            other => Err(CodecError::UnsupportedType(other.to_string())),
        }
    }

    fn parse(&self, label: &str) -> Result<Primitive, CodecError> {
        let invalid = || CodecError::InvalidValue {
            kind: self.name().to_string(),
            value: label.to_string(),
        };
        match self {
            ValueType::Str => Ok(Primitive::String(label.to_string())),
            ValueType::Int => label.parse().map(Primitive::Int).map_err(|_| invalid()),
            ValueType::Float => label.parse().map(Primitive::Float).map_err(|_| invalid()),
            ValueType::Bool => match label.to_ascii_lowercase().as_str() {
                "true" => Ok(Primitive::Bool(true)),
                "false" => Ok(Primitive::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded token
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCriterion {
    pub field: String,
    pub value: Primitive,
    pub value_type: ValueType,
}

/// Encode one criterion value into a token.
///
/// Field names must not contain `__VALUE=`.
pub fn encode(field: &str, value: &Primitive) -> String {
    format!(
        "{CRITERION_PREFIX}{field}{VALUE_MARKER}{value}{TYPE_MARKER}{}",
        value.type_name()
    )
}

/// Decode a token produced by [`encode`].
pub fn decode(token: &str) -> Result<DecodedCriterion, CodecError> {
    let malformed = || CodecError::MalformedToken(token.to_string());

    let rest = token.strip_prefix(CRITERION_PREFIX).ok_or_else(malformed)?;
    let (field, rest) = rest.split_once(VALUE_MARKER).ok_or_else(malformed)?;
    let (label, kind) = rest.rsplit_once(TYPE_MARKER).ok_or_else(malformed)?;

    let value_type = ValueType::from_name(kind)?;
    let value = value_type.parse(label)?;
    Ok(DecodedCriterion {
        field: field.to_string(),
        value,
        value_type,
    })
}

/// A removable token representing one applied criterion value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chip {
    /// Criterion key (a field name, or `row_index`)
    pub field: String,
    /// Text shown on the chip
    pub label: String,
    /// Token passed back when the chip is removed
    pub token: String,
}

impl Chip {
    /// Chip for one allowed value of a field criterion
    pub fn for_value(field: &str, value: &Primitive) -> Self {
        Self {
            field: field.to_string(),
            label: value.to_string(),
            token: encode(field, value),
        }
    }
}
