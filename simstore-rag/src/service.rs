//! Document indexing service.
//!
//! The [`DocumentIndexer`] implements store / search / delete by composing
//! the content identifier, an [`EmbeddingProvider`], and a [`VectorStore`].
//! It holds no state of its own; every durable effect lives in the store.
//!
//! # Example
//!
//! ```rust,ignore
//! use simstore_rag::{DocumentIndexer, IndexerConfig, InMemoryVectorStore, MockEmbeddingProvider};
//!
//! let indexer = DocumentIndexer::builder()
//!     .config(IndexerConfig::default())
//!     .access_gate(AccessGate::new("secret")?)
//!     .embedding_provider(Arc::new(MockEmbeddingProvider::new(64)))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! let receipt = indexer.store("hello world").await?;
//! let hits = indexer.search("hello", None).await?;
//! indexer.delete(&receipt.id, Some("secret")).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use simstore_auth::AccessGate;
use tracing::{error, info};

use crate::config::IndexerConfig;
use crate::document::{MutationAck, SearchResult, StoreReceipt, StoredDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Orchestrates content addressing, embedding, and the vector store.
///
/// Validation always runs before any upstream call, and within one operation
/// the embedding call completes before the store call that consumes it.
/// Construct one via [`DocumentIndexer::builder()`].
pub struct DocumentIndexer {
    config: IndexerConfig,
    gate: AccessGate,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl std::fmt::Debug for DocumentIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentIndexer")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .field("embedding_provider", &self.embedding_provider.name())
            .field("vector_store", &self.vector_store.backend())
            .finish()
    }
}

impl DocumentIndexer {
    /// Create a new [`DocumentIndexerBuilder`].
    pub fn builder() -> DocumentIndexerBuilder {
        DocumentIndexerBuilder::default()
    }

    /// Return a reference to the indexer configuration.
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Return the access gate guarding this indexer.
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Store `text` under its content identifier.
    ///
    /// Storing the same text again overwrites the same entry.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`] for empty text (no upstream call is made);
    /// - an upstream error if embedding or the upsert fails or times out.
    pub async fn store(&self, text: &str) -> Result<StoreReceipt> {
        require_non_empty("text", text)?;

        let vector = self.embed(text).await.inspect_err(|e| {
            error!(provider = self.embedding_provider.name(), text_len = text.len(), error = %e, "embedding failed during store");
        })?;
        let document = StoredDocument::new(text, vector);

        let ack = self
            .bounded("vector store upsert", self.vector_store.upsert(std::slice::from_ref(&document)))
            .await
            .inspect_err(|e| {
                error!(backend = self.vector_store.backend(), document.id = %document.id, error = %e, "upsert failed during store");
            })?;

        info!(
            document.id = %document.id,
            mutation_id = ack.mutation_id.as_deref().unwrap_or("-"),
            "stored document"
        );
        Ok(StoreReceipt { id: document.id, ack })
    }

    /// Return stored documents most similar to `query`.
    ///
    /// `limit` defaults to the configured default and is clamped to the
    /// configured maximum. Results keep the order the store returned.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`] for an empty query or a zero limit;
    /// - an upstream error if embedding or the query fails or times out.
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchResult>> {
        require_non_empty("query", query)?;
        let top_k = self.config.resolve_limit(limit)?;

        let query_vector = self.embed(query).await.inspect_err(|e| {
            error!(provider = self.embedding_provider.name(), query_len = query.len(), error = %e, "embedding failed during search");
        })?;

        let matches = self
            .bounded("vector store query", self.vector_store.query(&query_vector, top_k))
            .await
            .inspect_err(|e| {
                error!(backend = self.vector_store.backend(), top_k, error = %e, "vector store query failed");
            })?;

        let results: Vec<SearchResult> = matches.into_iter().map(SearchResult::from).collect();
        info!(top_k, result_count = results.len(), "search completed");
        Ok(results)
    }

    /// Delete the entry stored under `id`.
    ///
    /// `confirm_token` must match the gate's confirmation secret. Deleting an
    /// id that is not stored succeeds.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`] for an empty id;
    /// - [`RagError::Auth`] wrapping `Forbidden` for a wrong confirmation token;
    /// - an upstream error if the delete fails or times out.
    pub async fn delete(&self, id: &str, confirm_token: Option<&str>) -> Result<MutationAck> {
        require_non_empty("id", id)?;
        self.gate.confirm(confirm_token)?;

        let ack = self
            .bounded("vector store delete", self.vector_store.delete_by_ids(&[id]))
            .await
            .inspect_err(|e| {
                error!(backend = self.vector_store.backend(), document.id = %id, error = %e, "delete failed");
            })?;

        info!(document.id = %id, mutation_id = ack.mutation_id.as_deref().unwrap_or("-"), "deleted document");
        Ok(ack)
    }

    /// Embed `text` and check the vector against the provider's dimensions.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.bounded("embedding", self.embedding_provider.embed(text)).await?;
        let expected = self.embedding_provider.dimensions();
        if vector.len() != expected {
            return Err(RagError::EmbeddingError {
                provider: self.embedding_provider.name().to_string(),
                message: format!("expected {expected} dimensions, got {}", vector.len()),
            });
        }
        Ok(vector)
    }

    /// Run an upstream call under the configured timeout.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let after = self.config.upstream_timeout;
        tokio::time::timeout(after, call)
            .await
            .map_err(|_| RagError::Timeout { operation, after })?
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(RagError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Builder for constructing a [`DocumentIndexer`].
///
/// The access gate and both collaborators are required; the configuration
/// defaults to [`IndexerConfig::default()`].
#[derive(Default)]
pub struct DocumentIndexerBuilder {
    config: Option<IndexerConfig>,
    gate: Option<AccessGate>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl DocumentIndexerBuilder {
    /// Set the indexer configuration.
    pub fn config(mut self, config: IndexerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the access gate whose confirmation secret guards deletes.
    pub fn access_gate(mut self, gate: AccessGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`DocumentIndexer`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<DocumentIndexer> {
        let gate =
            self.gate.ok_or_else(|| RagError::ConfigError("access_gate is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;

        Ok(DocumentIndexer {
            config: self.config.unwrap_or_default(),
            gate,
            embedding_provider,
            vector_store,
        })
    }
}
