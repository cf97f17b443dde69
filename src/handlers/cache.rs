//! Persistence cache for the session blob

use crate::commands::{GraphError, GraphResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Key-value store holding serialized graphs
#[async_trait]
pub trait GraphCache: Send + Sync {
    /// Read the blob stored under `key`
    async fn get(&self, key: &str) -> GraphResult<Option<String>>;

    /// Store `blob` under `key`, replacing any previous value
    async fn set(&self, key: &str, blob: String) -> GraphResult<()>;

    /// Remove the blob stored under `key`
    async fn clear(&self, key: &str) -> GraphResult<()>;
}

/// In-memory implementation of the graph cache
pub struct InMemoryGraphCache {
    blobs: Mutex<HashMap<String, String>>,
}

impl Default for InMemoryGraphCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGraphCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
        }
    }

    /// Create a cache that already holds `blob` under `key`
    pub fn with_blob(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let cache = Self::new();
        if let Ok(mut blobs) = cache.blobs.lock() {
            blobs.insert(key.into(), blob.into());
        }
        cache
    }

    fn lock(&self) -> GraphResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.blobs
            .lock()
            .map_err(|_| GraphError::Cache("cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl GraphCache for InMemoryGraphCache {
    async fn get(&self, key: &str) -> GraphResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, blob: String) -> GraphResult<()> {
        self.lock()?.insert(key.to_string(), blob);
        Ok(())
    }

    async fn clear(&self, key: &str) -> GraphResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
