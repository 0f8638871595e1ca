//! Fill absent chunk embeddings in batches.
//!
//! A batch whose embedding call fails, or that comes back with the wrong count
//! or dimension, is left untouched and counted as failed; the remaining
//! batches still run.

use anyhow::{bail, Result};

use leaseqa_core::traits::Embedder;
use leaseqa_core::types::Chunk;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub filled: usize,
    pub failed: usize,
}

pub async fn backfill_embeddings(chunks: &mut [Chunk], embedder: &dyn Embedder, batch_size: usize) -> Result<BackfillReport> {
    if batch_size == 0 { bail!("batch_size must be at least 1"); }
    let pending: Vec<usize> = chunks.iter().enumerate().filter(|(_, c)| c.embedding.is_none()).map(|(i, _)| i).collect();
    let mut report = BackfillReport::default();
    for batch in pending.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|&i| chunks[i].content.clone()).collect();
        match embedder.embed_batch(&texts).await {
            Ok(vectors) if vectors.len() == texts.len() && vectors.iter().all(|v| v.len() == embedder.dim()) => {
                for (&i, v) in batch.iter().zip(vectors) { chunks[i].embedding = Some(v); }
                report.filled += batch.len();
            }
            Ok(vectors) => {
                tracing::warn!(expected = texts.len(), got = vectors.len(), dim = embedder.dim(), "embedder returned malformed batch");
                report.failed += batch.len();
            }
            Err(e) => {
                tracing::warn!(error = %e, batch = batch.len(), "embedding batch failed");
                report.failed += batch.len();
            }
        }
    }
    Ok(report)
}
