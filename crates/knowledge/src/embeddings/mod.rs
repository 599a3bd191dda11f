//! Embedding providers for vector store collections.
//!
//! The provider is chosen per collection from its `config.yaml`, so the
//! query path always embeds with the model the index was built with.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
