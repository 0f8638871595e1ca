//! Collaborator interfaces owned by subsystems outside this engine.
//!
//! All three are I/O bound in production (database, auth service, embedding
//! API), so they return boxed futures. Implementations must be cheap to share
//! across requests; the engine never holds a lock while awaiting them.

use futures::future::BoxFuture;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{Chunk, Document, DocumentId, OrgId};

/// Read-only repository of chunks with precomputed embeddings.
pub trait ChunkStore: Send + Sync {
    /// Chunks for exactly the requested, existing documents. Unknown ids are
    /// omitted. A transient failure is [`crate::error::Error::StoreUnavailable`].
    fn chunks_for_documents<'a>(&'a self, document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Chunk>>>;
}

/// Source of truth for org membership and document ownership.
pub trait EntitlementSource: Send + Sync {
    fn organizations_for_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<BTreeSet<OrgId>>>;
    /// Metadata for the requested documents that exist. Unknown ids are omitted.
    fn documents<'a>(&'a self, document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Document>>>;
}

/// Opaque text embedding capability.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g., `hashing:d256`).
    fn embedder_id(&self) -> &str;
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    /// One vector per input text, in input order.
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, anyhow::Result<Vec<Vec<f32>>>>;
}

impl<T: ChunkStore + ?Sized> ChunkStore for Arc<T> {
    fn chunks_for_documents<'a>(&'a self, document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Chunk>>> {
        (**self).chunks_for_documents(document_ids)
    }
}

impl<T: EntitlementSource + ?Sized> EntitlementSource for Arc<T> {
    fn organizations_for_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<BTreeSet<OrgId>>> {
        (**self).organizations_for_user(user_id)
    }
    fn documents<'a>(&'a self, document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Document>>> {
        (**self).documents(document_ids)
    }
}
