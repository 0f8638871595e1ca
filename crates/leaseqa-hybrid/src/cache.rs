//! Arena-style cache handed to the façade per call.
//!
//! Holds corpus snapshots keyed by the validated scope and query embeddings
//! keyed by embedder and query text. Entries are immutable `Arc`s with a TTL,
//! so concurrent requests share read-only data and a test that passes no
//! cache runs fully isolated.

use moka::sync::Cache;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use leaseqa_core::config::RetrievalSettings;
use leaseqa_core::types::DocumentId;
use leaseqa_text::Bm25Params;
use leaseqa_vector::EmbeddingCache;

use crate::snapshot::CorpusSnapshot;

pub struct RetrievalCache {
    snapshots: Cache<String, Arc<CorpusSnapshot>>,
    embeddings: EmbeddingCache,
}

impl RetrievalCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            snapshots: Cache::builder().max_capacity(capacity).time_to_live(ttl).build(),
            embeddings: EmbeddingCache::new(capacity, ttl),
        }
    }

    pub fn from_settings(settings: &RetrievalSettings) -> Self {
        Self::new(settings.cache_capacity, Duration::from_secs(settings.cache_ttl_secs))
    }

    /// blake3 over the sorted scope ids and the BM25 parameters the snapshot
    /// was built with.
    pub fn scope_key(scope: &BTreeSet<DocumentId>, params: Bm25Params) -> String {
        let mut hasher = blake3::Hasher::new();
        for id in scope {
            hasher.update(id.as_bytes());
            hasher.update(b"\n");
        }
        hasher.update(format!("k1={};b={}", params.k1, params.b).as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    pub fn snapshot(&self, key: &str) -> Option<Arc<CorpusSnapshot>> { self.snapshots.get(key) }

    pub fn put_snapshot(&self, key: String, snapshot: Arc<CorpusSnapshot>) { self.snapshots.insert(key, snapshot); }

    pub fn embeddings(&self) -> &EmbeddingCache { &self.embeddings }

    pub fn invalidate_all(&self) { self.snapshots.invalidate_all(); }
}

impl std::fmt::Debug for RetrievalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalCache").field("snapshots", &self.snapshots.entry_count()).field("embeddings", &self.embeddings).finish()
    }
}
