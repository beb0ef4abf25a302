//! Vector store trait: the similarity index behind the document service.

use async_trait::async_trait;

use crate::document::{MutationAck, QueryMatch, StoredDocument};
use crate::error::Result;

/// A storage backend for vector embeddings with similarity search.
///
/// The document service treats implementations as a black box with three
/// guarantees:
///
/// - [`upsert`](VectorStore::upsert) replaces any prior entry with the same id;
/// - [`query`](VectorStore::query) returns at most `top_k` entries ordered by
///   descending similarity, with payloads but without vector values;
/// - [`delete_by_ids`](VectorStore::delete_by_ids) removes entries that exist
///   and ignores ids that do not.
///
/// # Example
///
/// ```rust,ignore
/// use simstore_rag::{InMemoryVectorStore, StoredDocument, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.upsert(&[StoredDocument::new("hello", vec![1.0, 0.0])]).await?;
/// let matches = store.query(&[1.0, 0.0], 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace documents keyed by their ids.
    async fn upsert(&self, documents: &[StoredDocument]) -> Result<MutationAck>;

    /// Return the `top_k` entries most similar to `embedding`.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<QueryMatch>>;

    /// Delete entries by id. Unknown ids are not an error.
    async fn delete_by_ids(&self, ids: &[&str]) -> Result<MutationAck>;

    /// Short name used in logs and error messages.
    fn backend(&self) -> &str;
}
