//! Document Store
//!
//! In-memory map from canonical URI to the latest [`DocumentRecord`] of each
//! known stylesheet. Records are immutable once inserted and replaced whole,
//! so readers holding an `Arc` never observe a half-updated record.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::lsp_types::Url;

use super::document::DocumentRecord;
use super::uri;

/// Shared handle to the store, owned by the server and passed to the scanner
pub type StoreHandle = Arc<RwLock<DocumentStore>>;

/// All parsed documents of the workspace
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<Url, Arc<DocumentRecord>>,
}

impl DocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store behind a shared handle
    pub fn shared() -> StoreHandle {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentRecord>> {
        self.documents.get(&uri::canonical(uri)).cloned()
    }

    /// Borrow a record for the lifetime of the store guard
    pub fn document(&self, uri: &Url) -> Option<&DocumentRecord> {
        self.documents.get(&uri::canonical(uri)).map(|r| r.as_ref())
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(&uri::canonical(uri))
    }

    /// Insert or replace the record for its URI
    pub fn set(&mut self, record: DocumentRecord) -> Arc<DocumentRecord> {
        let key = uri::canonical(&record.uri);
        let record = Arc::new(record);
        self.documents.insert(key, Arc::clone(&record));
        record
    }

    /// Remove a record, returning it if it was present
    pub fn delete(&mut self, uri: &Url) -> Option<Arc<DocumentRecord>> {
        self.documents.remove(&uri::canonical(uri))
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Canonical URIs of every stored document
    pub fn keys(&self) -> impl Iterator<Item = &Url> {
        self.documents.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Url, &Arc<DocumentRecord>)> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::parser::{parse, Dialect};

    fn record(uri: &str, text: &str) -> DocumentRecord {
        parse(text, Dialect::Scss).into_record(
            Url::parse(uri).unwrap(),
            None,
            text.to_string(),
            Dialect::Scss,
        )
    }

    #[test]
    fn test_set_get_delete() {
        let mut store = DocumentStore::new();
        store.set(record("file:///p/a.scss", "$a: 1;"));
        store.set(record("file:///p/b.scss", "$b: 2;"));
        assert_eq!(store.len(), 2);

        let a = store.get(&Url::parse("file:///p/a.scss").unwrap()).unwrap();
        assert!(a.variables.contains_key("$a"));

        assert!(store.delete(&Url::parse("file:///p/a.scss").unwrap()).is_some());
        assert!(store.delete(&Url::parse("file:///p/a.scss").unwrap()).is_none());
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_keys_are_canonical() {
        let mut store = DocumentStore::new();
        store.set(record("file:///p/styles/../a.scss", "$a: 1;"));

        assert!(store.contains(&Url::parse("file:///p/a.scss").unwrap()));
        let keys: Vec<String> = store.keys().map(|k| k.path().to_string()).collect();
        assert_eq!(keys, vec!["/p/a.scss"]);
    }

    #[test]
    fn test_set_replaces_whole_record() {
        let mut store = DocumentStore::new();
        store.set(record("file:///p/a.scss", "$a: 1;\n$b: 2;"));
        store.set(record("file:///p/a.scss", "$a: 3;"));

        let a = store.get(&Url::parse("file:///p/a.scss").unwrap()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(a.variables.len(), 1);
        assert_eq!(a.variables["$a"].value.as_deref(), Some("3"));
    }
}
