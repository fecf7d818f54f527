use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use beaverdam_core::{declared_id, DocumentStore, StoreError, Value};

use crate::{assign_id, next_key};

/// Table holding the documents; other tables in the file are kept as-is
const DEFAULT_TABLE: &str = "_default";

/// A stored document under its integer table key
#[derive(Debug, Clone)]
struct Record {
    key: u64,
    /// The document's `_id`, or the key when it declares none
    id: String,
    document: Value,
}

impl Record {
    fn new(key: u64, document: Value) -> Self {
        let id = declared_id(&document).unwrap_or_else(|| key.to_string());
        Self { key, id, document }
    }
}

/// Documents in one JSON file, under integer keys in the `_default` table.
///
/// A document's id is its `_id` field, falling back to its table key. The
/// whole file is rewritten after every insert or delete.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Vec<Record>,
    other_tables: BTreeMap<String, serde_json::Value>,
}

impl JsonFileStore {
    /// Open a store file. A missing or empty file is an empty store; the
    /// file is created on the first mutation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(StoreError::Io(format!("{}: {}", path.display(), e))),
        };

        let mut other_tables: BTreeMap<String, serde_json::Value> = if text.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&text)
                .map_err(|e| StoreError::Parse(format!("{}: {}", path.display(), e)))?
        };

        let records = match other_tables.remove(DEFAULT_TABLE) {
            Some(table) => {
                let table: BTreeMap<String, Value> = serde_json::from_value(table)
                    .map_err(|e| StoreError::Parse(format!("{} table: {}", DEFAULT_TABLE, e)))?;
                let mut records = table
                    .into_iter()
                    .map(|(key, document)| {
                        let key = key.parse::<u64>().map_err(|_| {
                            StoreError::Parse(format!("document key '{}' is not an integer", key))
                        })?;
                        Ok(Record::new(key, document))
                    })
                    .collect::<Result<Vec<_>, StoreError>>()?;
                records.sort_by_key(|record| record.key);
                records
            }
            None => Vec::new(),
        };

        info!(path = %path.display(), documents = records.len(), "opened JSON store");
        Ok(Self {
            path,
            records,
            other_tables,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let mut tables = serde_json::Map::new();
        for (name, table) in &self.other_tables {
            tables.insert(name.clone(), table.clone());
        }
        let documents: BTreeMap<String, &Value> = self
            .records
            .iter()
            .map(|record| (record.key.to_string(), &record.document))
            .collect();
        let documents =
            serde_json::to_value(documents).map_err(|e| StoreError::Storage(e.to_string()))?;
        tables.insert(DEFAULT_TABLE.to_string(), documents);

        let text = serde_json::to_string(&tables).map_err(|e| StoreError::Storage(e.to_string()))?;
        std::fs::write(&self.path, text)
            .map_err(|e| StoreError::Io(format!("{}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), documents = self.records.len(), "persisted JSON store");
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn query(&self, _projection: &[&str]) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(self
            .records
            .iter()
            .map(|record| (record.id.clone(), record.document.clone()))
            .collect())
    }

    fn insert(&mut self, document: Value) -> Result<String, StoreError> {
        let key = next_key(self.records.iter().map(|record| record.key));
        let ids: Vec<&str> = self.records.iter().map(|record| record.id.as_str()).collect();
        let id = assign_id(&ids, &document, || key.to_string())?;
        self.records.push(Record { key, id: id.clone(), document });
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }
        info!(id = %id, key, "inserted document");
        Ok(id)
    }

    fn delete_by_id(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(index) = self.records.iter().position(|record| record.id == id) else {
            return Ok(false);
        };
        let removed = self.records.remove(index);
        if let Err(e) = self.persist() {
            self.records.insert(index, removed);
            return Err(e);
        }
        info!(id = %id, "deleted document");
        Ok(true)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    fn ids(store: &JsonFileStore) -> Vec<String> {
        store.query(&[]).unwrap().into_iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn missing_file_is_empty_until_first_insert() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());

        store.insert(doc(r#"{"session": {"task": "reach"}}"#)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn reads_table_layout_in_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(
            &path,
            r#"{"_default": {"10": {"n": 10}, "2": {"n": 2}, "1": {"n": 1}}}"#,
        )
        .unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(ids(&store), ["1", "2", "10"]);
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.insert(doc(r#"{"n": 1}"#)).unwrap(), "1");
        assert_eq!(store.insert(doc(r#"{"_id": "s01", "n": 2}"#)).unwrap(), "s01");
        assert_eq!(store.insert(doc(r#"{"n": 3}"#)).unwrap(), "3");
        assert!(store.delete_by_id("1").unwrap());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(ids(&reopened), ["s01", "3"]);
        let (_, last) = &reopened.query(&[]).unwrap()[1];
        assert_eq!(last.get("n"), Some(&Value::Int(3)));
    }

    #[test]
    fn document_ids_come_from_id_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(
            &path,
            r#"{"_default": {"1": {"_id": "session01", "task": "reach"}, "2": {"_id": "session02", "task": "grasp"}}}"#,
        )
        .unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(ids(&store), ["session01", "session02"]);

        assert!(store.delete_by_id("session01").unwrap());
        assert!(!store.delete_by_id("1").unwrap());
        assert_eq!(store.insert(doc(r#"{"_id": "session03"}"#)).unwrap(), "session03");
        assert!(matches!(
            store.insert(doc(r#"{"_id": "session02"}"#)),
            Err(StoreError::AlreadyExists(_))
        ));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let keys: Vec<&str> = raw["_default"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["2", "3"]);
        assert_eq!(raw["_default"]["3"]["_id"], serde_json::json!("session03"));
    }

    #[test]
    fn non_integer_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, r#"{"_default": {"s01": {"n": 1}}}"#).unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Parse(_))));
    }

    #[test]
    fn keeps_other_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, r#"{"archive": {"1": {"old": true}}}"#).unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        store.insert(doc(r#"{"new": true}"#)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["archive"]["1"]["old"], serde_json::json!(true));
        assert_eq!(raw["_default"]["1"]["new"], serde_json::json!(true));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Parse(_))));
    }

    #[test]
    fn delete_missing_id_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(!store.delete_by_id("1").unwrap());
        assert!(!path.exists());
    }
}
