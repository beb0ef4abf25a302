//! # simstore-rag
//!
//! Content-addressed text indexing for the simstore service.
//!
//! Text is identified by the SHA-1 digest of its bytes ([`content_id`]),
//! embedded by an [`EmbeddingProvider`], and kept in a [`VectorStore`]. The
//! [`DocumentIndexer`] ties the three together into idempotent store, search,
//! and delete operations.
//!
//! ## Backends
//!
//! | Concern | Implementation | Feature |
//! |---------|----------------|---------|
//! | Embeddings | [`MockEmbeddingProvider`] (deterministic) | default |
//! | Embeddings | `cloudflare::WorkersAiEmbeddingProvider` | `cloudflare` |
//! | Embeddings | `openai::OpenAiEmbeddingProvider` | `openai` |
//! | Vector store | [`InMemoryVectorStore`] | default |
//! | Vector store | `cloudflare::VectorizeStore` | `cloudflare` |

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod identity;
pub mod inmemory;
pub mod mock;
pub mod service;
pub mod vectorstore;

#[cfg(feature = "cloudflare")]
pub mod cloudflare;
#[cfg(feature = "openai")]
pub mod openai;

pub use config::{IndexerConfig, IndexerConfigBuilder};
pub use document::{
    MISSING_TEXT_SENTINEL, MutationAck, QueryMatch, SearchResult, StoreReceipt, StoredDocument,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use identity::{content_id, is_content_id};
pub use inmemory::InMemoryVectorStore;
pub use mock::MockEmbeddingProvider;
pub use service::{DocumentIndexer, DocumentIndexerBuilder};
pub use vectorstore::VectorStore;
