//! Domain types shared by the retrievers, the fusion ranker and the façade.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

pub type DocumentId = String;
pub type ChunkId = String;
pub type OrgId = String;
pub type UserId = String;

/// Number of results returned when the caller does not pick one.
pub const DEFAULT_TOP_K: usize = 8;
pub const DEFAULT_LEXICAL_WEIGHT: f32 = 0.4;
pub const DEFAULT_VECTOR_WEIGHT: f32 = 0.6;

/// Lifecycle of an uploaded document. Owned by the upload pipeline; this
/// engine only reads it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Analyzed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub org_id: OrgId,
    pub title: String,
    pub status: DocumentStatus,
}

/// A bounded slice of a document's text, the unit of retrieval.
///
/// - `id`: globally unique chunk identifier
/// - `document_id`: the owning document
/// - `page_number`: page the text was extracted from, used for citations
/// - `chunk_index`: position within the document, unique per document
/// - `embedding`: absent while generation is pending or after it failed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub page_number: u32,
    pub chunk_index: usize,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Indicates which retriever produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Lexical,
    Vector,
}

/// The minimal surface returned by both retrievers.
///
/// `id` matches `Chunk::id`. `score` is retriever-specific (BM25 or cosine)
/// but higher is always better.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub id: ChunkId,
    pub score: f32,
    pub source: SourceKind,
}

/// Per-retriever fusion weights. Need not sum to 1; see [`Weights::normalized`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawWeights")]
pub struct Weights {
    lexical: f32,
    vector: f32,
}

/// Wire form of [`Weights`]; deserialization goes through [`Weights::new`].
#[derive(Deserialize)]
struct RawWeights {
    lexical: f32,
    vector: f32,
}

impl TryFrom<RawWeights> for Weights {
    type Error = Error;

    fn try_from(raw: RawWeights) -> Result<Self> { Self::new(raw.lexical, raw.vector) }
}

impl Weights {
    pub fn new(lexical: f32, vector: f32) -> Result<Self> {
        if !lexical.is_finite() || !vector.is_finite() {
            return Err(Error::InvalidOptions("weights must be finite".into()));
        }
        if lexical < 0.0 || vector < 0.0 {
            return Err(Error::InvalidOptions(format!("weights must be non-negative, got [{lexical}, {vector}]")));
        }
        if lexical + vector <= 0.0 {
            return Err(Error::InvalidOptions("at least one weight must be positive".into()));
        }
        Ok(Self { lexical, vector })
    }

    pub fn lexical(&self) -> f32 { self.lexical }
    pub fn vector(&self) -> f32 { self.vector }

    /// `(lexical, vector)` scaled to sum to 1.
    pub fn normalized(&self) -> (f32, f32) {
        let total = self.lexical + self.vector;
        (self.lexical / total, self.vector / total)
    }
}

impl Default for Weights {
    fn default() -> Self { Self { lexical: DEFAULT_LEXICAL_WEIGHT, vector: DEFAULT_VECTOR_WEIGHT } }
}

/// Retrieval configuration for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    document_ids: BTreeSet<DocumentId>,
    top_k: usize,
    weights: Weights,
    require_documents: bool,
}

impl SearchOptions {
    pub fn new<I, S>(document_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<DocumentId>,
    {
        Self {
            document_ids: document_ids.into_iter().map(Into::into).collect(),
            top_k: DEFAULT_TOP_K,
            weights: Weights::default(),
            require_documents: false,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::InvalidOptions("top_k must be at least 1".into()));
        }
        self.top_k = top_k;
        Ok(self)
    }

    #[must_use]
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// When set, a scope that validates to empty fails with
    /// [`Error::EmptyScope`] instead of producing an empty result.
    #[must_use]
    pub fn require_documents(mut self, required: bool) -> Self {
        self.require_documents = required;
        self
    }

    pub fn document_ids(&self) -> &BTreeSet<DocumentId> { &self.document_ids }
    pub fn top_k(&self) -> usize { self.top_k }
    pub fn weights(&self) -> Weights { self.weights }
    pub fn requires_documents(&self) -> bool { self.require_documents }
}

/// Validated subset of a request's document ids plus their display titles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntitlementSet {
    pub valid_ids: BTreeSet<DocumentId>,
    pub titles: BTreeMap<DocumentId, String>,
}

impl EntitlementSet {
    pub fn is_empty(&self) -> bool { self.valid_ids.is_empty() }
    pub fn contains(&self, id: &str) -> bool { self.valid_ids.contains(id) }
}

/// One fused result. Created per query and never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredChunk {
    pub chunk_id: ChunkId,
    pub document_id: DocumentId,
    pub chunk_index: usize,
    pub page_number: u32,
    pub content: String,
    pub lexical_score: Option<f32>,
    pub vector_score: Option<f32>,
    pub fused_score: f32,
    /// 1-based position in the result.
    pub rank: usize,
}

/// State of the dense retrieval path for a request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VectorSignal {
    Available,
    /// Retrieval never ran (empty query or empty scope).
    Skipped,
    /// No chunk in scope carries an embedding, so no embedding call was made.
    NoEmbeddedChunks,
    /// The embedding call failed or timed out.
    Unavailable { reason: String },
}

/// Why a result holds no chunks.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    EmptyQuery,
    EmptyScope,
    NoMatches,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RetrievalResult {
    pub chunks: Vec<ScoredChunk>,
    pub scope: BTreeSet<DocumentId>,
    pub titles: BTreeMap<DocumentId, String>,
    pub vector: VectorSignal,
    pub empty: Option<EmptyReason>,
}

impl RetrievalResult {
    /// A result for a request that never reached the retrievers.
    pub fn skipped(reason: EmptyReason, access: EntitlementSet) -> Self {
        Self { chunks: Vec::new(), scope: access.valid_ids, titles: access.titles, vector: VectorSignal::Skipped, empty: Some(reason) }
    }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    /// True when retrieval ran but ranking had no dense signal to work with.
    pub fn is_degraded(&self) -> bool {
        matches!(self.vector, VectorSignal::NoEmbeddedChunks | VectorSignal::Unavailable { .. })
    }
}
