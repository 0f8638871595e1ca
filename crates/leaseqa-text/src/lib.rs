//! leaseqa-text
//!
//! Lexical retrieval: a shared tokenizer and BM25 scoring over the chunks of
//! a single request's validated scope.

pub mod bm25;
pub mod tokenize;

pub use bm25::{Bm25Index, Bm25Params};
pub use tokenize::tokenize;

use leaseqa_core::types::{Chunk, SearchHit};

/// Build an index over `chunks` and score `query` against it in one call.
pub fn lexical_search(chunks: &[Chunk], query: &str, params: Bm25Params) -> Vec<SearchHit> {
    Bm25Index::build(chunks, params).search(query)
}
