//! Browser `localStorage` backend for WebAssembly.
//!
//! Documents are stored as JSON strings under their id. `localStorage` is
//! synchronous, so every future here is ready on first poll.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::Document;
use wasm_bindgen::JsValue;

/// `window.localStorage` wrapper.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

fn js_error(context: &str, e: JsValue) -> StorageError {
    StorageError::Io(format!("{}: {:?}", context, e))
}

impl LocalStorage {
    /// Open the window's local storage.
    pub fn new() -> StorageResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| js_error("localStorage error", e))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl Storage for LocalStorage {
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let result = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(|json| {
                self.storage
                    .set_item(id, &json)
                    .map_err(|e| js_error("Failed to write localStorage", e))
            });
        Box::pin(async move { result })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let result = self
            .storage
            .get_item(id)
            .map_err(|e| js_error("Failed to read localStorage", e))
            .and_then(|item| item.ok_or_else(|| StorageError::NotFound(id.to_string())))
            .and_then(|json| {
                Document::from_json(&json).map_err(|e| {
                    StorageError::Serialization(format!("Failed to parse {}: {}", id, e))
                })
            });
        Box::pin(async move { result })
    }
}
