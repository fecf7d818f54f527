//! Document trees and projected cell values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A node of a semi-structured metadata document.
///
/// Documents are arbitrary trees of objects, arrays and primitives, as
/// produced by the ingestion pipeline (one JSON document per session/file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Human-readable name for the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Look up a key if this node is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }
}

/// A single primitive value stored in a table cell or allowed by a criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Primitive {
    /// Convert a document node into a primitive, if it is one.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Primitive::Null),
            Value::Bool(b) => Some(Primitive::Bool(*b)),
            Value::Int(i) => Some(Primitive::Int(*i)),
            Value::Float(f) => Some(Primitive::Float(*f)),
            Value::String(s) => Some(Primitive::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Kind name used in chip tokens.
    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Bool(_) => "bool",
            Primitive::Int(_) => "int",
            Primitive::Float(_) => "float",
            Primitive::String(_) => "str",
        }
    }

    /// Whether this value equals an allowed criterion value.
    ///
    /// Integers and floats compare numerically. `Null` never matches
    /// anything, itself included.
    pub fn matches(&self, other: &Primitive) -> bool {
        match (self, other) {
            (Primitive::Null, _) | (_, Primitive::Null) => false,
            (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
            (Primitive::Int(a), Primitive::Int(b)) => a == b,
            (Primitive::Float(a), Primitive::Float(b)) => a == b,
            (Primitive::Int(a), Primitive::Float(b)) | (Primitive::Float(b), Primitive::Int(a)) => {
                int_equals_float(*a, *b)
            }
            (Primitive::String(a), Primitive::String(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }
}

/// Exact comparison; floats outside the `i64` range or with a fractional
/// part never equal an integer.
fn int_equals_float(int: i64, float: f64) -> bool {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    float.fract() == 0.0 && (-LIMIT..LIMIT).contains(&float) && float as i64 == int
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Null => write!(f, "null"),
            Primitive::Bool(true) => write!(f, "True"),
            Primitive::Bool(false) => write!(f, "False"),
            Primitive::Int(i) => write!(f, "{}", i),
            Primitive::Float(x) => write!(f, "{}", x),
            Primitive::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::String(s.to_string())
    }
}

impl From<String> for Primitive {
    fn from(s: String) -> Self {
        Primitive::String(s)
    }
}

impl From<i64> for Primitive {
    fn from(i: i64) -> Self {
        Primitive::Int(i)
    }
}

impl From<f64> for Primitive {
    fn from(x: f64) -> Self {
        Primitive::Float(x)
    }
}

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Bool(b)
    }
}

/// The projected value of one field in one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocValue {
    /// The path resolved to a single primitive
    Scalar(Primitive),
    /// The path resolved to a list of primitives
    List(Vec<Primitive>),
    /// The path could not be resolved in this document
    Missing,
}

impl DocValue {
    /// Whether any primitive in this cell is among the allowed values.
    ///
    /// `Missing` never satisfies a criterion; neither does an empty list.
    pub fn satisfies(&self, allowed: &[Primitive]) -> bool {
        match self {
            DocValue::Scalar(p) => allowed.iter().any(|a| p.matches(a)),
            DocValue::List(items) => items
                .iter()
                .any(|p| allowed.iter().any(|a| p.matches(a))),
            DocValue::Missing => false,
        }
    }

    /// The primitives held by this cell, in order.
    pub fn primitives(&self) -> &[Primitive] {
        match self {
            DocValue::Scalar(p) => std::slice::from_ref(p),
            DocValue::List(items) => items,
            DocValue::Missing => &[],
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, DocValue::Missing)
    }
}

impl fmt::Display for DocValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocValue::Scalar(p) => write!(f, "{}", p),
            DocValue::List(items) => {
                let labels: Vec<String> = items.iter().map(|p| p.to_string()).collect();
                write!(f, "{}", labels.join(", "))
            }
            DocValue::Missing => Ok(()),
        }
    }
}
