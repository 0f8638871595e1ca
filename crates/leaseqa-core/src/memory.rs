//! In-process reference backend: documents, chunks and org memberships held in
//! plain maps. Loadable from a JSON fixture for the CLI and used as the store
//! in tests.

use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{Error, Result};
use crate::traits::{ChunkStore, EntitlementSource};
use crate::types::{Chunk, Document, DocumentId, OrgId, UserId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryStore {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    /// user id -> organizations the user belongs to
    #[serde(default)]
    pub memberships: BTreeMap<UserId, BTreeSet<OrgId>>,
}

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let store: Self = serde_json::from_str(&raw)?;
        store.check_chunk_keys()?;
        Ok(store)
    }

    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    #[must_use]
    pub fn with_document(mut self, document: Document) -> Self { self.documents.push(document); self }

    #[must_use]
    pub fn with_chunk(mut self, chunk: Chunk) -> Self { self.chunks.push(chunk); self }

    #[must_use]
    pub fn with_member(mut self, user_id: &str, org_id: &str) -> Self {
        self.memberships.entry(user_id.to_string()).or_default().insert(org_id.to_string());
        self
    }

    /// `(document_id, chunk_index)` must be unique.
    fn check_chunk_keys(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for c in &self.chunks {
            if !seen.insert((c.document_id.as_str(), c.chunk_index)) {
                return Err(Error::InvalidConfig(format!("duplicate chunk index {} in document {}", c.chunk_index, c.document_id)));
            }
        }
        Ok(())
    }
}

impl ChunkStore for InMemoryStore {
    fn chunks_for_documents<'a>(&'a self, document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Chunk>>> {
        let chunks = self.chunks.iter().filter(|c| document_ids.contains(&c.document_id)).cloned().collect();
        future::ready(Ok(chunks)).boxed()
    }
}

impl EntitlementSource for InMemoryStore {
    fn organizations_for_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<BTreeSet<OrgId>>> {
        let orgs = self.memberships.get(user_id).cloned().unwrap_or_default();
        future::ready(Ok(orgs)).boxed()
    }

    fn documents<'a>(&'a self, document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Document>>> {
        let docs = self.documents.iter().filter(|d| document_ids.contains(&d.id)).cloned().collect();
        future::ready(Ok(docs)).boxed()
    }
}
