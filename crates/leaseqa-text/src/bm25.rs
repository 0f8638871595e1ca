//! BM25 over a per-request chunk scope.
//!
//! Statistics (document frequency, average length) are computed over the
//! chunks handed to [`Bm25Index::build`] only, never a global corpus, since the
//! scope changes with every request.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use leaseqa_core::error::{Error, Result};
use leaseqa_core::types::{Chunk, ChunkId, SearchHit, SourceKind};

use crate::tokenize::tokenize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: 1.2, b: 0.75 } }
}

impl Bm25Params {
    pub fn new(k1: f32, b: f32) -> Result<Self> {
        if !k1.is_finite() || k1 <= 0.0 {
            return Err(Error::InvalidConfig(format!("bm25 k1 must be positive, got {k1}")));
        }
        if !(0.0..=1.0).contains(&b) {
            return Err(Error::InvalidConfig(format!("bm25 b must be within [0, 1], got {b}")));
        }
        Ok(Self { k1, b })
    }
}

/// Inverted index plus length statistics for one chunk scope.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    params: Bm25Params,
    ids: Vec<ChunkId>,
    lengths: Vec<u32>,
    avg_len: f32,
    /// term -> (chunk position, term frequency), positions ascending
    postings: HashMap<String, Vec<(usize, u32)>>,
}

impl Bm25Index {
    pub fn build(chunks: &[Chunk], params: Bm25Params) -> Self {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut ids = Vec::with_capacity(chunks.len());
        let mut lengths = Vec::with_capacity(chunks.len());
        for (pos, chunk) in chunks.iter().enumerate() {
            let tokens = tokenize(&chunk.content);
            let mut tf: HashMap<String, u32> = HashMap::new();
            for t in &tokens { *tf.entry(t.clone()).or_default() += 1; }
            for (term, count) in tf { postings.entry(term).or_default().push((pos, count)); }
            ids.push(chunk.id.clone());
            lengths.push(u32::try_from(tokens.len()).unwrap_or(u32::MAX));
        }
        let total: f64 = lengths.iter().map(|&l| f64::from(l)).sum();
        let avg_len = if chunks.is_empty() { 0.0 } else { (total / chunks.len() as f64) as f32 };
        tracing::trace!(chunks = chunks.len(), terms = postings.len(), avg_len, "built bm25 index");
        Self { params, ids, lengths, avg_len, postings }
    }

    pub fn len(&self) -> usize { self.ids.len() }
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }
    pub fn params(&self) -> Bm25Params { self.params }

    pub fn doc_freq(&self, term: &str) -> usize { self.postings.get(term).map_or(0, Vec::len) }

    /// `ln(1 + (N - df + 0.5) / (df + 0.5))`, never negative.
    pub fn idf(&self, term: &str) -> f32 {
        let n = self.ids.len() as f32;
        let df = self.doc_freq(term) as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Chunks with at least one query term, best first. Ties keep scope order,
    /// which the caller sorts by `(document_id, chunk_index)`.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        // Sorted and deduplicated so float accumulation order is fixed.
        let terms: BTreeSet<String> = tokenize(query).into_iter().collect();
        if terms.is_empty() || self.is_empty() { return Vec::new(); }

        let Bm25Params { k1, b } = self.params;
        let mut scores: Vec<f32> = vec![0.0; self.ids.len()];
        let mut matched: Vec<bool> = vec![false; self.ids.len()];
        for term in &terms {
            let Some(list) = self.postings.get(term) else { continue };
            let idf = self.idf(term);
            for &(pos, tf) in list {
                let tf = tf as f32;
                let len_ratio = if self.avg_len > 0.0 { self.lengths[pos] as f32 / self.avg_len } else { 1.0 };
                scores[pos] += idf * (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * len_ratio));
                matched[pos] = true;
            }
        }

        let mut hits: Vec<(usize, f32)> = scores.into_iter().enumerate().filter(|&(pos, s)| matched[pos] && s > 0.0).collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        hits.into_iter().map(|(pos, score)| SearchHit { id: self.ids[pos].clone(), score, source: SourceKind::Lexical }).collect()
    }
}
