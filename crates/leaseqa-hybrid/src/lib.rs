//! leaseqa-hybrid
//!
//! The retrieval façade and the pieces it orchestrates: access validation,
//! weighted min-max fusion of lexical and vector scores, and prompt context
//! formatting.

pub mod access;
pub mod cache;
pub mod engine;
pub mod format;
pub mod fusion;
pub mod snapshot;

pub use access::validate_document_access;
pub use cache::RetrievalCache;
pub use engine::{EngineConfig, RetrievalEngine, SearchStage};
pub use format::{format_results_for_prompt, FormatOptions};
pub use fusion::{fuse, min_max_normalize};
pub use snapshot::CorpusSnapshot;
