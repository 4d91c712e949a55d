use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::ObjectStore;
use crate::error::StoreError;

/// In-memory implementation of [`ObjectStore`].
///
/// Backs the unit and integration test suites and doubles as a scratch
/// backend for local experiments. Tracks how many times each key has been
/// written so tests can tell idempotent overwrite apart from duplication.
///
/// Cloning is cheap and clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<(String, String), Bytes>>>,
    put_counts: Arc<RwLock<HashMap<(String, String), usize>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, e.g. a source image for a service test.
    pub async fn insert(&self, bucket: &str, key: &str, body: Bytes) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), body);
    }

    /// All keys currently stored in the given bucket, unsorted.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Number of objects in the given bucket.
    pub async fn len(&self, bucket: &str) -> usize {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .count()
    }

    /// Whether the given bucket holds no objects.
    pub async fn is_empty(&self, bucket: &str) -> bool {
        self.len(bucket).await == 0
    }

    /// How many times `put_object` has been called for this key.
    pub async fn put_count(&self, bucket: &str, key: &str) -> usize {
        self.put_counts
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", bucket, key)))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        let id = (bucket.to_string(), key.to_string());
        *self.put_counts.write().await.entry(id.clone()).or_insert(0) += 1;
        self.objects.write().await.insert(id, body);
        Ok(())
    }
}
