//! Dotted field paths and document projection
//!
//! A path such as `info.subject.0.name` is walked one segment at a time.
//! Each segment is first tried as an object key, then as a list index
//! (negative indices count from the end). A segment that cannot be followed
//! makes the whole path resolve to [`DocValue::Missing`]; sparse documents
//! are the normal case, so this is never an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::value::{DocValue, Primitive, Value};

/// A dotted access path into a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    /// The path as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The individual segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk the path through `document`, returning the node it ends on.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |node, segment| step(node, segment))
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Follow one segment: key lookup on objects, integer index on arrays.
fn step<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => {
            let index: i64 = segment.parse().ok()?;
            let len = items.len() as i64;
            let index = if index < 0 { len + index } else { index };
            if (0..len).contains(&index) {
                items.get(index as usize)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Project one field out of a document.
///
/// Returns `Missing` when the path cannot be followed, `Scalar` for a
/// primitive leaf and `List` for an array of primitives. A leaf that is an
/// object, or an array holding objects or arrays, has no tabular value in
/// this document and also reads as `Missing`.
pub fn extract(document: &Value, path: &FieldPath) -> DocValue {
    let Some(leaf) = path.resolve(document) else {
        return DocValue::Missing;
    };

    let projected = match leaf {
        Value::Array(items) => items
            .iter()
            .map(Primitive::from_value)
            .collect::<Option<Vec<_>>>()
            .map(DocValue::List),
        other => Primitive::from_value(other).map(DocValue::Scalar),
    };
    projected.unwrap_or_else(|| {
        warn!(path = %path, found = leaf.kind(), "path ends on a nested value; treating as missing");
        DocValue::Missing
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn doc(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[rstest]
    #[case("a.b.0.c", DocValue::Scalar(Primitive::Int(1)))]
    #[case("a.b.1.c", DocValue::Scalar(Primitive::Int(2)))]
    #[case("a.b.-1.c", DocValue::Scalar(Primitive::Int(2)))]
    #[case("a.b.9.c", DocValue::Missing)]
    #[case("a.b.-3.c", DocValue::Missing)]
    #[case("a.x", DocValue::Missing)]
    #[case("a.b.first", DocValue::Missing)]
    #[case("a.b.0.c.d", DocValue::Missing)]
    fn resolves_nested_paths(#[case] path: &str, #[case] expected: DocValue) {
        let document = doc(r#"{"a": {"b": [{"c": 1}, {"c": 2}]}}"#);
        assert_eq!(extract(&document, &FieldPath::new(path)), expected);
    }

    #[test]
    fn key_lookup_wins_over_index() {
        let document = doc(r#"{"0": "key"}"#);
        assert_eq!(
            extract(&document, &"0".into()),
            DocValue::Scalar("key".into())
        );
    }

    #[test]
    fn list_of_primitives() {
        let document = doc(r#"{"tags": ["a", "b"], "empty": []}"#);
        assert_eq!(
            extract(&document, &"tags".into()),
            DocValue::List(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            extract(&document, &"empty".into()),
            DocValue::List(vec![])
        );
    }

    #[test]
    fn null_leaf_is_present() {
        let document = doc(r#"{"a": null}"#);
        assert_eq!(
            extract(&document, &"a".into()),
            DocValue::Scalar(Primitive::Null)
        );
    }

    #[test]
    fn nested_leaf_reads_as_missing() {
        let document = doc(r#"{"a": {"b": 1}, "l": [{"b": 1}], "m": [1, [2]]}"#);
        assert_eq!(extract(&document, &"a".into()), DocValue::Missing);
        assert_eq!(extract(&document, &"l".into()), DocValue::Missing);
        assert_eq!(extract(&document, &"m".into()), DocValue::Missing);
        assert_eq!(extract(&document, &"a.b".into()), DocValue::Scalar(Primitive::Int(1)));
    }

    #[test]
    fn path_serializes_as_string() {
        let path = FieldPath::new("a.b.0");
        assert_eq!(path.segments(), ["a", "b", "0"]);
        assert_eq!(serde_json::to_string(&path).unwrap(), r#""a.b.0""#);
    }
}
