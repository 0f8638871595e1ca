//! Embedding providers that ship with the engine.
//!
//! Production embedders live with the caller and implement
//! [`leaseqa_core::traits::Embedder`]; the hashing provider here is
//! deterministic and offline, for development and tests.

pub mod hashing;

pub use hashing::HashingEmbedder;
