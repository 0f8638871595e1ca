use futures::future::{self, BoxFuture, FutureExt};
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use leaseqa_core::traits::Embedder;

pub const DEFAULT_HASHING_DIM: usize = 256;

/// Feature-hashing embedder: each lowercase alphanumeric token lands in a
/// bucket chosen by XxHash64 with a weight derived from the same hash, and the vector is
/// L2-normalized. Texts sharing tokens get positive cosine similarity.
pub struct HashingEmbedder {
    dim: usize,
    id: String,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("hashing:d{dim}") }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        let lowered = text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let val = 0.5 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += val;
        }
        let norm = crate::similarity::l2_norm(&v);
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        v
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self { Self::new(DEFAULT_HASHING_DIM) }
}

impl Embedder for HashingEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, anyhow::Result<Vec<Vec<f32>>>> {
        future::ready(Ok(texts.iter().map(|t| self.embed_text(t)).collect())).boxed()
    }
}
