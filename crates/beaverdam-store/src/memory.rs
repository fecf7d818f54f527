use tracing::debug;

use beaverdam_core::{DocumentStore, StoreError, Value};

use crate::{assign_id, next_key};

/// In-memory document store, insertion ordered
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<(String, Value)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from documents, assigning ids as [`insert`](DocumentStore::insert) would.
    pub fn from_documents(documents: impl IntoIterator<Item = Value>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for document in documents {
            store.insert(document)?;
        }
        Ok(store)
    }
}

impl DocumentStore for MemoryStore {
    fn query(&self, _projection: &[&str]) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(self.documents.clone())
    }

    fn insert(&mut self, document: Value) -> Result<String, StoreError> {
        let ids: Vec<&str> = self.documents.iter().map(|(id, _)| id.as_str()).collect();
        let next = next_key(ids.iter().filter_map(|id| id.parse().ok()));
        let id = assign_id(&ids, &document, || next.to_string())?;
        debug!(id = %id, "inserted document");
        self.documents.push((id.clone(), document));
        Ok(id)
    }

    fn delete_by_id(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.documents.len();
        self.documents.retain(|(existing, _)| existing != id);
        Ok(self.documents.len() != before)
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}
