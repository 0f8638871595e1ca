use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use leaseqa_core::config::RetrievalSettings;
use leaseqa_core::error::{Error, Result};
use leaseqa_core::traits::{ChunkStore, Embedder, EntitlementSource};
use leaseqa_core::types::{DocumentId, EmptyReason, EntitlementSet, RetrievalResult, SearchHit, SearchOptions, Weights};
use leaseqa_text::Bm25Params;
use leaseqa_vector::VectorRetriever;

use crate::access::validate_document_access;
use crate::cache::RetrievalCache;
use crate::format::{format_results_for_prompt, FormatOptions};
use crate::fusion::fuse;
use crate::snapshot::CorpusSnapshot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub bm25: Bm25Params,
    pub embed_timeout: Duration,
    pub default_top_k: usize,
    pub default_weights: Weights,
    pub format: FormatOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_settings(&RetrievalSettings::default()).unwrap_or(Self {
            bm25: Bm25Params::default(),
            embed_timeout: Duration::from_secs(5),
            default_top_k: leaseqa_core::types::DEFAULT_TOP_K,
            default_weights: Weights::default(),
            format: FormatOptions::default(),
        })
    }
}

impl EngineConfig {
    pub fn from_settings(s: &RetrievalSettings) -> Result<Self> {
        if s.top_k == 0 { return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".into())); }
        if s.embed_timeout_ms == 0 { return Err(Error::InvalidConfig("retrieval.embed_timeout_ms must be positive".into())); }
        let default_weights = Weights::new(s.lexical_weight, s.vector_weight).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(Self {
            bm25: Bm25Params::new(s.bm25_k1, s.bm25_b)?,
            embed_timeout: Duration::from_millis(s.embed_timeout_ms),
            default_top_k: s.top_k,
            default_weights,
            format: FormatOptions { max_chars: s.max_context_chars },
        })
    }
}

/// Per-request lifecycle, reported through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    Validating,
    Retrieving,
    Fusing,
    Done,
    Failed,
}

/// The retrieval façade: access validation, concurrent lexical and vector
/// retrieval, and fusion. Holds no mutable state; every request is
/// independent unless the caller passes a [`RetrievalCache`].
pub struct RetrievalEngine<S, A>
where
    S: ChunkStore,
    A: EntitlementSource,
{
    store: S,
    entitlements: A,
    vector: VectorRetriever,
    config: EngineConfig,
}

impl<S, A> RetrievalEngine<S, A>
where
    S: ChunkStore,
    A: EntitlementSource,
{
    pub fn new(store: S, entitlements: A, embedder: Arc<dyn Embedder>, config: EngineConfig) -> Self {
        let vector = VectorRetriever::new(embedder, config.embed_timeout);
        Self { store, entitlements, vector, config }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Options for `document_ids` carrying the configured default top-k and weights.
    pub fn options<I, D>(&self, document_ids: I) -> Result<SearchOptions>
    where
        I: IntoIterator<Item = D>,
        D: Into<DocumentId>,
    {
        Ok(SearchOptions::new(document_ids).with_top_k(self.config.default_top_k)?.with_weights(self.config.default_weights))
    }

    pub async fn validate_document_access(&self, user_id: &str, document_ids: &BTreeSet<DocumentId>) -> Result<EntitlementSet> {
        validate_document_access(&self.entitlements, user_id, document_ids).await
    }

    /// Render `result` with the configured context budget.
    pub fn format_results_for_prompt(&self, result: &RetrievalResult) -> String {
        format_results_for_prompt(&result.chunks, &result.titles, &self.config.format)
    }

    /// Top-k passages for `query` across the documents in `options` that
    /// `user_id` may read.
    ///
    /// An empty query or empty validated scope gives an empty result with the
    /// reason set (or [`Error::EmptyScope`] when the options require
    /// documents). A failed or slow embedder degrades to lexical-only. A store
    /// outage is [`Error::StoreUnavailable`].
    pub async fn multi_doc_ensemble_search(
        &self,
        user_id: &str,
        query: &str,
        options: &SearchOptions,
        cache: Option<&RetrievalCache>,
    ) -> Result<RetrievalResult> {
        let span = tracing::debug_span!("multi_doc_ensemble_search", requested = options.document_ids().len(), top_k = options.top_k());
        let outcome = self.search(user_id, query, options, cache).instrument(span.clone()).await;
        span.in_scope(|| match &outcome {
            Ok(r) => tracing::debug!(stage = ?SearchStage::Done, results = r.chunks.len(), degraded = r.is_degraded(), "search finished"),
            Err(e) => tracing::debug!(stage = ?SearchStage::Failed, error = %e, "search failed"),
        });
        outcome
    }

    async fn search(&self, user_id: &str, query: &str, options: &SearchOptions, cache: Option<&RetrievalCache>) -> Result<RetrievalResult> {
        tracing::debug!(stage = ?SearchStage::Validating);
        let access = self.validate_document_access(user_id, options.document_ids()).await?;
        if access.is_empty() {
            if options.requires_documents() { return Err(Error::EmptyScope); }
            return Ok(RetrievalResult::skipped(EmptyReason::EmptyScope, access));
        }
        if query.trim().is_empty() {
            return Ok(RetrievalResult::skipped(EmptyReason::EmptyQuery, access));
        }

        tracing::debug!(stage = ?SearchStage::Retrieving, scope = access.valid_ids.len());
        let snapshot = self.snapshot(&access.valid_ids, cache).await?;
        let lexical = lexical_task(Arc::clone(&snapshot), query.to_string());
        let vector = self.vector.search(query, snapshot.chunks(), cache.map(RetrievalCache::embeddings));
        let (vector, lexical) = tokio::join!(vector, lexical);
        let lexical = lexical?;

        tracing::debug!(stage = ?SearchStage::Fusing, lexical = lexical.len(), vector = vector.hits.len());
        let chunks = fuse(snapshot.chunks(), &lexical, &vector.hits, options.weights(), options.top_k());
        let empty = chunks.is_empty().then_some(EmptyReason::NoMatches);
        Ok(RetrievalResult { chunks, scope: access.valid_ids, titles: access.titles, vector: vector.signal, empty })
    }

    /// Chunks for exactly the validated scope, from the cache when present.
    async fn snapshot(&self, scope: &BTreeSet<DocumentId>, cache: Option<&RetrievalCache>) -> Result<Arc<CorpusSnapshot>> {
        let key = cache.map(|_| RetrievalCache::scope_key(scope, self.config.bm25));
        if let (Some(c), Some(k)) = (cache, key.as_deref()) {
            if let Some(hit) = c.snapshot(k) {
                tracing::debug!(chunks = hit.len(), "corpus snapshot cache hit");
                return Ok(hit);
            }
        }

        let raw = self.store.chunks_for_documents(scope).await.map_err(|e| match e {
            Error::StoreUnavailable(_) => e,
            other => Error::StoreUnavailable(other.to_string()),
        })?;
        let owned_scope = scope.clone();
        let params = self.config.bm25;
        let snapshot = tokio::task::spawn_blocking(move || CorpusSnapshot::build(raw, &owned_scope, params))
            .await
            .map_err(|e| Error::Operation(format!("snapshot build task failed: {e}")))?;
        let snapshot = Arc::new(snapshot);
        if let (Some(c), Some(k)) = (cache, key) { c.put_snapshot(k, Arc::clone(&snapshot)); }
        Ok(snapshot)
    }
}

/// BM25 scoring off the async executor.
async fn lexical_task(snapshot: Arc<CorpusSnapshot>, query: String) -> Result<Vec<SearchHit>> {
    tokio::task::spawn_blocking(move || snapshot.bm25().search(&query))
        .await
        .map_err(|e| Error::Operation(format!("lexical scoring task failed: {e}")))
}
