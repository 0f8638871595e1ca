//! leaseqa-core
//!
//! Domain types, collaborator traits, the error taxonomy and configuration
//! shared by the lexical, vector and hybrid retrieval crates.

pub mod config;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
