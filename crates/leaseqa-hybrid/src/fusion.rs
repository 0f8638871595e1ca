//! Weighted min-max fusion of the lexical and vector score lists.
//!
//! Each list is normalized to [0, 1] on its own before weighting, so BM25's
//! open-ended range cannot drown out cosine similarity regardless of the
//! configured weights. A chunk missing from one list contributes 0 for it.

use std::collections::{BTreeMap, HashMap};

use leaseqa_core::types::{Chunk, ScoredChunk, SearchHit, Weights};

/// Min-max normalize scores to [0, 1]. A single hit, or a list where every
/// score is equal, normalizes to 1.0.
pub fn min_max_normalize(hits: &[SearchHit]) -> HashMap<&str, f32> {
    let (min, max) = hits.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), h| (lo.min(h.score), hi.max(h.score)));
    let range = max - min;
    hits.iter()
        .map(|h| {
            let n = if range > 0.0 && range.is_finite() { (h.score - min) / range } else { 1.0 };
            (h.id.as_str(), n)
        })
        .collect()
}

#[derive(Default)]
struct Entry {
    lexical_raw: Option<f32>,
    vector_raw: Option<f32>,
}

/// Merge both lists over `chunks` (the request's scope) into at most `top_k`
/// results. Ordered by fused score descending, then `(document_id,
/// chunk_index, chunk_id)` ascending. Hits whose id is not in `chunks` are
/// ignored.
pub fn fuse(chunks: &[Chunk], lexical: &[SearchHit], vector: &[SearchHit], weights: Weights, top_k: usize) -> Vec<ScoredChunk> {
    let by_id: HashMap<&str, &Chunk> = chunks.iter().map(|c| (c.id.as_str(), c)).collect();
    let lex_norm = min_max_normalize(lexical);
    let vec_norm = min_max_normalize(vector);
    let (w_lex, w_vec) = weights.normalized();

    let mut union: BTreeMap<&str, Entry> = BTreeMap::new();
    for h in lexical { union.entry(h.id.as_str()).or_default().lexical_raw = Some(h.score); }
    for h in vector { union.entry(h.id.as_str()).or_default().vector_raw = Some(h.score); }

    let mut fused: Vec<ScoredChunk> = union
        .into_iter()
        .filter_map(|(id, entry)| {
            let chunk = by_id.get(id)?;
            let nl = lex_norm.get(id).copied().unwrap_or(0.0);
            let nv = vec_norm.get(id).copied().unwrap_or(0.0);
            Some(ScoredChunk {
                chunk_id: chunk.id.clone(),
                document_id: chunk.document_id.clone(),
                chunk_index: chunk.chunk_index,
                page_number: chunk.page_number,
                content: chunk.content.clone(),
                lexical_score: entry.lexical_raw,
                vector_score: entry.vector_raw,
                fused_score: w_lex * nl + w_vec * nv,
                rank: 0,
            })
        })
        .collect();

    fused.sort_by(|a, b| {
        b.fused_score
            .total_cmp(&a.fused_score)
            .then_with(|| a.document_id.cmp(&b.document_id))
            .then_with(|| a.chunk_index.cmp(&b.chunk_index))
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    fused.truncate(top_k);
    for (i, sc) in fused.iter_mut().enumerate() { sc.rank = i + 1; }
    fused
}
