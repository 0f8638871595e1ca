#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use leaseqa_core::error::{Error, Result};
use leaseqa_core::memory::InMemoryStore;
use leaseqa_core::traits::{ChunkStore, Embedder, EntitlementSource};
use leaseqa_core::types::{Chunk, Document, DocumentId, DocumentStatus, OrgId};
use leaseqa_hybrid::{EngineConfig, RetrievalEngine};

pub const TOPICS: [&str; 3] = ["rent", "pet", "repair"];

/// One axis per topic stem plus a small constant axis, so every text gets a
/// non-zero vector and topic overlap drives cosine similarity.
pub fn topic_vector(text: &str) -> Vec<f32> {
    let lowered = text.to_lowercase();
    let mut v: Vec<f32> = TOPICS.iter().map(|t| lowered.matches(t).count() as f32).collect();
    v.push(0.1);
    v
}

pub struct TopicEmbedder;

impl Embedder for TopicEmbedder {
    fn embedder_id(&self) -> &str { "topic" }
    fn dim(&self) -> usize { TOPICS.len() + 1 }
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, anyhow::Result<Vec<Vec<f32>>>> {
        let out = texts.iter().map(|t| topic_vector(t)).collect();
        async move { Ok(out) }.boxed()
    }
}

/// A differently sized model: valid vectors, none comparable with the stored ones.
pub struct WideEmbedder;

impl Embedder for WideEmbedder {
    fn embedder_id(&self) -> &str { "wide" }
    fn dim(&self) -> usize { 16 }
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, anyhow::Result<Vec<Vec<f32>>>> {
        let out = texts.iter().map(|_| vec![0.25; 16]).collect();
        async move { Ok(out) }.boxed()
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embedder_id(&self) -> &str { "failing" }
    fn dim(&self) -> usize { TOPICS.len() + 1 }
    fn embed_batch<'a>(&'a self, _texts: &'a [String]) -> BoxFuture<'a, anyhow::Result<Vec<Vec<f32>>>> {
        async { Err(anyhow::anyhow!("embedding service returned 503")) }.boxed()
    }
}

pub struct SlowEmbedder;

impl Embedder for SlowEmbedder {
    fn embedder_id(&self) -> &str { "slow" }
    fn dim(&self) -> usize { TOPICS.len() + 1 }
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, anyhow::Result<Vec<Vec<f32>>>> {
        async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(texts.iter().map(|t| topic_vector(t)).collect())
        }
        .boxed()
    }
}

pub fn document(id: &str, org: &str, title: &str) -> Document {
    Document { id: id.into(), org_id: org.into(), title: title.into(), status: DocumentStatus::Analyzed }
}

pub fn chunk(doc: &str, idx: usize, page: u32, text: &str) -> Chunk {
    Chunk { id: format!("{doc}:{idx}"), document_id: doc.into(), page_number: page, chunk_index: idx, content: text.into(), embedding: Some(topic_vector(text)) }
}

/// D1 is a lease with a rent escalation clause, D2 a pet policy. Both belong
/// to `org-a`; `alice` is a member of `org-a`, `bob` of `org-b`.
pub fn lease_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_document(document("d1", "org-a", "Lease Agreement"))
        .with_document(document("d2", "org-a", "Pet Policy Addendum"))
        .with_chunk(chunk("d1", 0, 1, "This lease commences on January 1 and runs for five years."))
        .with_chunk(chunk("d1", 1, 4, "Rent escalation: the annual rent increase is three percent, applied on each anniversary of the commencement date."))
        .with_chunk(chunk("d1", 2, 6, "Tenant handles minor repair work; landlord handles structural repair."))
        .with_chunk(chunk("d2", 0, 1, "Pets permitted: cats and small dogs with a refundable pet deposit."))
        .with_chunk(chunk("d2", 1, 2, "Pet owners must clean common areas after their animals."))
        .with_member("alice", "org-a")
        .with_member("bob", "org-b")
}

pub fn ids(list: &[&str]) -> BTreeSet<DocumentId> { list.iter().map(|s| s.to_string()).collect() }

pub fn engine_with<S: ChunkStore, A: EntitlementSource>(store: S, entitlements: A, embedder: Arc<dyn Embedder>) -> RetrievalEngine<S, A> {
    let config = EngineConfig { embed_timeout: Duration::from_millis(100), ..EngineConfig::default() };
    RetrievalEngine::new(store, entitlements, embedder, config)
}

pub fn lease_engine() -> RetrievalEngine<Arc<InMemoryStore>, Arc<InMemoryStore>> {
    let store = Arc::new(lease_store());
    engine_with(Arc::clone(&store), store, Arc::new(TopicEmbedder))
}

/// Wraps a store and counts fetches.
pub struct CountingStore<S> {
    pub inner: S,
    pub calls: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self { Self { inner, calls: AtomicUsize::new(0) } }
    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl<S: ChunkStore> ChunkStore for CountingStore<S> {
    fn chunks_for_documents<'a>(&'a self, document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Chunk>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.chunks_for_documents(document_ids)
    }
}

pub struct DownStore;

impl ChunkStore for DownStore {
    fn chunks_for_documents<'a>(&'a self, _document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Chunk>>> {
        async { Err(Error::StoreUnavailable("connection reset".into())) }.boxed()
    }
}

/// Ignores the requested ids and returns every chunk it holds.
pub struct LeakyStore(pub Vec<Chunk>);

impl ChunkStore for LeakyStore {
    fn chunks_for_documents<'a>(&'a self, _document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Chunk>>> {
        let all = self.0.clone();
        async move { Ok(all) }.boxed()
    }
}

pub struct DownEntitlements;

impl EntitlementSource for DownEntitlements {
    fn organizations_for_user<'a>(&'a self, _user_id: &'a str) -> BoxFuture<'a, Result<BTreeSet<OrgId>>> {
        async { Err(Error::Operation("auth service timeout".into())) }.boxed()
    }
    fn documents<'a>(&'a self, _document_ids: &'a BTreeSet<DocumentId>) -> BoxFuture<'a, Result<Vec<Document>>> {
        async { Ok(Vec::new()) }.boxed()
    }
}
