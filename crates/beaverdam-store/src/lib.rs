//! beaverdam-store - Document store backends
//!
//! - [`MemoryStore`]: documents held in memory, insertion ordered
//! - [`JsonFileStore`]: a single JSON file in the table layout
//!   `{"_default": {"1": {...}, "2": {...}}}`, rewritten on every mutation.
//!   Documents are identified by their `_id` field, else by their table key

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use beaverdam_core::{declared_id, StoreError, Value};

/// One past the largest key in use, starting at 1
pub(crate) fn next_key(keys: impl IntoIterator<Item = u64>) -> u64 {
    keys.into_iter().max().map_or(1, |max| max + 1)
}

/// Check a document is an object and pick its id.
///
/// A declared `_id` wins; otherwise `fallback` supplies one. Either way the
/// id must not already be in `existing`.
pub(crate) fn assign_id(
    existing: &[&str],
    document: &Value,
    fallback: impl FnOnce() -> String,
) -> Result<String, StoreError> {
    if !matches!(document, Value::Object(_)) {
        return Err(StoreError::NotAnObject(document.kind()));
    }
    let id = declared_id(document).unwrap_or_else(fallback);
    if existing.contains(&id.as_str()) {
        return Err(StoreError::AlreadyExists(id));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn next_key_is_one_past_max() {
        assert_eq!(next_key([1, 7, 3]), 8);
        assert_eq!(next_key([]), 1);
    }

    #[test]
    fn declared_id_wins_over_fallback() {
        let existing = ["1", "s01"];
        assert_eq!(
            assign_id(&existing, &doc(r#"{"_id": "s02"}"#), || "9".into()).unwrap(),
            "s02"
        );
        assert_eq!(assign_id(&existing, &doc(r#"{"a": 1}"#), || "9".into()).unwrap(), "9");
    }

    #[test]
    fn ids_must_be_unique() {
        let existing = ["s01"];
        assert!(matches!(
            assign_id(&existing, &doc(r#"{"_id": "s01"}"#), || "2".into()),
            Err(StoreError::AlreadyExists(id)) if id == "s01"
        ));
    }

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(
            assign_id(&[], &doc("[1, 2]"), || "1".into()),
            Err(StoreError::NotAnObject("array"))
        ));
    }
}
