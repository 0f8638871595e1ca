use std::sync::Arc;
use std::time::Duration;

use leaseqa_core::traits::Embedder;
use leaseqa_core::types::{Chunk, SearchHit, SourceKind, VectorSignal};

use crate::cache::EmbeddingCache;
use crate::similarity::{cosine_similarity, l2_norm};

/// Hits from the dense path plus whether the signal was there at all.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorOutcome {
    pub hits: Vec<SearchHit>,
    pub signal: VectorSignal,
}

impl VectorOutcome {
    fn without_signal(signal: VectorSignal) -> Self { Self { hits: Vec::new(), signal } }
}

/// Scores chunks by cosine similarity to the query embedding.
///
/// A failing or slow embedder never fails the request: the outcome carries
/// [`VectorSignal::Unavailable`] and no hits, and fusion proceeds lexical-only.
#[derive(Clone)]
pub struct VectorRetriever {
    embedder: Arc<dyn Embedder>,
    timeout: Duration,
}

impl VectorRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, timeout: Duration) -> Self { Self { embedder, timeout } }

    pub fn embedder_id(&self) -> &str { self.embedder.embedder_id() }

    /// Embed `query` under the configured timeout. The error is a reason
    /// string for [`VectorSignal::Unavailable`].
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, String> {
        let texts = vec![query.to_string()];
        let mut vectors = match tokio::time::timeout(self.timeout, self.embedder.embed_batch(&texts)).await {
            Err(_) => return Err(format!("embedding timed out after {}ms", self.timeout.as_millis())),
            Ok(Err(e)) => return Err(format!("embedding failed: {e}")),
            Ok(Ok(v)) => v,
        };
        if vectors.len() != 1 {
            return Err(format!("embedder returned {} vectors for 1 input", vectors.len()));
        }
        let q = vectors.remove(0);
        if q.is_empty() || l2_norm(&q) == 0.0 || q.iter().any(|x| !x.is_finite()) {
            return Err("embedder returned a degenerate query vector".into());
        }
        Ok(q)
    }

    pub async fn search(&self, query: &str, chunks: &[Chunk], cache: Option<&EmbeddingCache>) -> VectorOutcome {
        if !chunks.iter().any(|c| c.embedding.is_some()) {
            tracing::debug!("no embedded chunks in scope, skipping query embedding");
            return VectorOutcome::without_signal(VectorSignal::NoEmbeddedChunks);
        }

        let cached = cache.and_then(|c| c.get(self.embedder_id(), query));
        let q_vec = match cached {
            Some(v) => v,
            None => match self.embed_query(query).await {
                Ok(v) => {
                    let v = Arc::new(v);
                    if let Some(c) = cache { c.put(self.embedder_id(), query, Arc::clone(&v)); }
                    v
                }
                Err(reason) => {
                    tracing::warn!(embedder = self.embedder_id(), %reason, "vector retrieval degraded to lexical-only");
                    return VectorOutcome::without_signal(VectorSignal::Unavailable { reason });
                }
            },
        };

        let hits = score_chunks(&q_vec, chunks);
        if hits.is_empty() {
            // Embedded chunks exist but none is comparable with the query, e.g. after a model swap.
            let reason = format!("embedding dimension mismatch: no chunk embedding usable with a {}-dim query", q_vec.len());
            tracing::warn!(embedder = self.embedder_id(), %reason, "vector retrieval degraded to lexical-only");
            return VectorOutcome::without_signal(VectorSignal::Unavailable { reason });
        }
        VectorOutcome { hits, signal: VectorSignal::Available }
    }
}

/// Cosine score for every chunk with a usable embedding, best first. Chunks
/// without one are skipped rather than scored 0. Negative similarities are
/// kept. Ties keep input order.
pub fn score_chunks(query_vec: &[f32], chunks: &[Chunk]) -> Vec<SearchHit> {
    let mut skipped = 0usize;
    let mut scored: Vec<(usize, f32)> = Vec::with_capacity(chunks.len());
    for (pos, chunk) in chunks.iter().enumerate() {
        let Some(emb) = chunk.embedding.as_deref() else { continue };
        match cosine_similarity(query_vec, emb) {
            Some(s) => scored.push((pos, s)),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "skipped chunk embeddings with mismatched dimension or zero norm");
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(pos, score)| SearchHit { id: chunks[pos].id.clone(), score, source: SourceKind::Vector }).collect()
}
