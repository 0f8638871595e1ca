//! Query-embedding cache keyed by `(embedder_id, content_hash)`.
//!
//! Consulted before calling the embedder and written through on a miss.
//! Entries expire after a TTL; the cache is an explicit object the caller
//! owns, never process-global state.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

pub fn hash_content(s: &str) -> String { blake3::hash(s.as_bytes()).to_hex().to_string() }

#[derive(Clone)]
pub struct EmbeddingCache {
    inner: Cache<String, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self { inner: Cache::builder().max_capacity(capacity).time_to_live(ttl).build() }
    }

    fn key(embedder_id: &str, text: &str) -> String { format!("{}:{}", embedder_id, hash_content(text)) }

    pub fn get(&self, embedder_id: &str, text: &str) -> Option<Arc<Vec<f32>>> { self.inner.get(&Self::key(embedder_id, text)) }

    pub fn put(&self, embedder_id: &str, text: &str, vector: Arc<Vec<f32>>) { self.inner.insert(Self::key(embedder_id, text), vector); }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache").field("entries", &self.inner.entry_count()).finish()
    }
}
