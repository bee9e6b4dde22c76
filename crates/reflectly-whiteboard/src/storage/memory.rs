//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::Document;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for tests, previews and hosts without a durable store.
///
/// Entries are kept as serialized JSON, the same bytes a file or
/// `localStorage` backend would hold, so loads go through the same parsing
/// and dangling-connection cleanup as every other store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a document is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    /// Raw JSON stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    /// Store raw text under `key`, bypassing serialization. Lets callers
    /// seed hand-written or corrupted payloads.
    pub fn insert_raw(&self, key: impl Into<String>, json: impl Into<String>) -> StorageResult<()> {
        self.entries
            .write()
            .map_err(lock_error)?
            .insert(key.into(), json.into());
        Ok(())
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()));
        Box::pin(async move { self.insert_raw(id, json?) })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let id = id.to_string();
        Box::pin(async move {
            let json = self
                .entries
                .read()
                .map_err(lock_error)?
                .get(&id)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(id.clone()))?;
            Document::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", id, e))
            })
        })
    }
}
