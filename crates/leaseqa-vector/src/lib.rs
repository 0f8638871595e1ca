//! leaseqa-vector
//!
//! Dense retrieval: cosine scoring of precomputed chunk embeddings against a
//! query embedding obtained from an injected [`leaseqa_core::traits::Embedder`].

pub mod cache;
pub mod embed_backfill;
pub mod embed_provider;
pub mod retriever;
pub mod similarity;

pub use cache::EmbeddingCache;
pub use embed_backfill::{backfill_embeddings, BackfillReport};
pub use embed_provider::HashingEmbedder;
pub use retriever::{score_chunks, VectorOutcome, VectorRetriever};
pub use similarity::cosine_similarity;
