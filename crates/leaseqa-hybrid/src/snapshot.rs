//! Immutable per-scope corpus: the chunks of the validated documents plus
//! their BM25 statistics.

use std::collections::{BTreeSet, HashSet};

use leaseqa_core::types::{Chunk, DocumentId};
use leaseqa_text::{Bm25Index, Bm25Params};

#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    chunks: Vec<Chunk>,
    bm25: Bm25Index,
}

impl CorpusSnapshot {
    /// Chunks outside `scope`, duplicate chunk ids and empty chunks are
    /// dropped; the rest is ordered by `(document_id, chunk_index, id)`.
    pub fn build(raw: Vec<Chunk>, scope: &BTreeSet<DocumentId>, params: Bm25Params) -> Self {
        let fetched = raw.len();
        let mut chunks: Vec<Chunk> = raw.into_iter().filter(|c| scope.contains(&c.document_id)).collect();
        let foreign = fetched - chunks.len();
        if foreign > 0 {
            tracing::warn!(foreign, "chunk store returned chunks outside the requested scope; dropped");
        }
        chunks.retain(|c| !c.content.trim().is_empty());
        chunks.sort_by(|a, b| {
            a.document_id.cmp(&b.document_id).then(a.chunk_index.cmp(&b.chunk_index)).then_with(|| a.id.cmp(&b.id))
        });
        let mut seen = HashSet::new();
        chunks.retain(|c| seen.insert(c.id.clone()));

        let bm25 = Bm25Index::build(&chunks, params);
        Self { chunks, bm25 }
    }

    pub fn chunks(&self) -> &[Chunk] { &self.chunks }
    pub fn bm25(&self) -> &Bm25Index { &self.bm25 }
    pub fn len(&self) -> usize { self.chunks.len() }
    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }
}
