//! Document store interface
//!
//! The browsing core only needs `query`; `insert` and `delete_by_id` serve
//! the ingestion path. Backends live in the `beaverdam-store` crate.

use crate::value::Value;

/// Field holding a document's stable identifier
pub const ID_FIELD: &str = "_id";

/// The trait that all document backends implement.
pub trait DocumentStore {
    /// Return every document as `(id, document)` in a stable order.
    ///
    /// `projection` lists the dotted paths the caller will read. Backends
    /// may use it to trim documents, or return them whole.
    fn query(&self, projection: &[&str]) -> Result<Vec<(String, Value)>, StoreError>;

    /// Insert a document, returning its id.
    ///
    /// A string or integer `_id` field is used as the id; otherwise the
    /// backend assigns one.
    fn insert(&mut self, document: Value) -> Result<String, StoreError>;

    /// Delete a document. Returns whether a document was removed.
    fn delete_by_id(&mut self, id: &str) -> Result<bool, StoreError>;

    /// Number of stored documents
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The id a document declares for itself, if any
pub fn declared_id(document: &Value) -> Option<String> {
    match document.get(ID_FIELD)? {
        Value::String(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

/// Errors from document stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Documents must be JSON objects, got {0}")]
    NotAnObject(&'static str),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_id_reads_string_or_int() {
        let doc: Value = serde_json::from_str(r#"{"_id": "s01"}"#).unwrap();
        assert_eq!(declared_id(&doc), Some("s01".to_string()));
        let doc: Value = serde_json::from_str(r#"{"_id": 7}"#).unwrap();
        assert_eq!(declared_id(&doc), Some("7".to_string()));
        let doc: Value = serde_json::from_str(r#"{"_id": [1]}"#).unwrap();
        assert_eq!(declared_id(&doc), None);
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::AlreadyExists("s01".into());
        assert!(err.to_string().contains("s01"));
    }
}
