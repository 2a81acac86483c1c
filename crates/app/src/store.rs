//! Document store
//!
//! The persistence boundary: a key-value document store holding one JSON
//! document per aggregate (cart, shopper, offer pool, orders, redemptions).
//! The engine never knows whether the backing store is browser storage, a
//! database, or memory. Reads degrade to the empty default so first use and
//! flaky reads never crash a page; writes surface their failure to the
//! caller as a retryable error.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

/// Errors surfaced by the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached; the caller should retry.
    #[error("persistence unavailable")]
    Unavailable,

    /// A document could not be serialized.
    #[error("serialization failed")]
    Serialize(#[source] serde_json::Error),
}

/// One JSON document per key.
#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load the document at `key`, `None` if absent.
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Save the document at `key`, replacing any existing one.
    async fn save(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// In-memory document store backing tests and the demo.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<FxHashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.docs.write().await.insert(key.to_string(), value);

        Ok(())
    }
}

/// Load and deserialize the document at `key`.
///
/// Any failure — store unavailable, document absent, document malformed —
/// degrades to `None`; services substitute their empty default.
pub async fn load_doc<T: DeserializeOwned>(store: &dyn DocumentStore, key: &str) -> Option<T> {
    let value = match store.load(key).await {
        Ok(value) => value?,
        Err(err) => {
            warn!(key, %err, "document read failed; defaulting to empty");
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(doc) => Some(doc),
        Err(err) => {
            warn!(key, %err, "document malformed; defaulting to empty");
            None
        }
    }
}

/// Serialize and save a document at `key`.
///
/// # Errors
///
/// Returns a [`StoreError`] if serialization fails or the store rejects the
/// write; mutating operations propagate this to the user as "try again".
pub async fn save_doc<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    key: &str,
    doc: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(doc).map_err(StoreError::Serialize)?;

    store.save(key, value).await
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        count: u32,
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = MemoryStore::new();

        save_doc(&store, "doc", &Doc { count: 3 })
            .await
            .expect("save should succeed");

        let loaded: Option<Doc> = load_doc(&store, "doc").await;

        assert_eq!(loaded, Some(Doc { count: 3 }));
    }

    #[tokio::test]
    async fn absent_document_loads_as_none() {
        let store = MemoryStore::new();

        let loaded: Option<Doc> = load_doc(&store, "missing").await;

        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn malformed_document_degrades_to_none() {
        let store = MemoryStore::new();

        store
            .save("doc", Value::String("not a doc".to_string()))
            .await
            .expect("raw save should succeed");

        let loaded: Option<Doc> = load_doc(&store, "doc").await;

        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn unavailable_store_degrades_reads_to_none() {
        let mut store = MockDocumentStore::new();
        store
            .expect_load()
            .returning(|_| Err(StoreError::Unavailable));

        let loaded: Option<Doc> = load_doc(&store, "doc").await;

        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn failed_write_propagates_to_the_caller() {
        let mut store = MockDocumentStore::new();
        store
            .expect_save()
            .returning(|_, _| Err(StoreError::Unavailable));

        let result = save_doc(&store, "doc", &Doc { count: 1 }).await;

        assert!(matches!(result, Err(StoreError::Unavailable)));
    }
}
