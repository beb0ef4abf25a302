//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency vector store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable
//! for development, testing, and small-scale use cases.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::{MutationAck, QueryMatch, StoredDocument};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

/// An in-memory vector store using cosine similarity for search.
///
/// Documents are keyed by id, so upserting the same id replaces the entry.
/// Every mutation is acknowledged with a fresh UUID mutation id.
///
/// # Example
///
/// ```rust,ignore
/// use simstore_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::with_dimensions(768);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
    dimensions: Option<usize>,
}

impl InMemoryVectorStore {
    /// Create a new empty store accepting vectors of any length.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects vectors whose length is not `dimensions`.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { documents: RwLock::default(), dimensions: Some(dimensions) }
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Fetch a stored document by id.
    pub async fn get(&self, id: &str) -> Option<StoredDocument> {
        self.documents.read().await.get(id).cloned()
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        match self.dimensions {
            Some(expected) if vector.len() != expected => Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!("expected {expected} dimensions, got {}", vector.len()),
            }),
            _ => Ok(()),
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn new_mutation() -> MutationAck {
    MutationAck::new(Uuid::new_v4().to_string())
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, documents: &[StoredDocument]) -> Result<MutationAck> {
        for doc in documents {
            self.check_dimensions(&doc.vector)?;
        }
        let mut store = self.documents.write().await;
        for doc in documents {
            store.insert(doc.id.clone(), doc.clone());
        }
        Ok(new_mutation())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        self.check_dimensions(embedding)?;
        let store = self.documents.read().await;

        let mut scored: Vec<(f32, &StoredDocument)> =
            store.values().map(|doc| (cosine_similarity(&doc.vector, embedding), doc)).collect();

        // Ties broken by id so repeated queries are stable.
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.1.id.cmp(&b.1.id))
        });
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(score, doc)| QueryMatch { id: doc.id.clone(), score, payload: Some(doc.payload()) })
            .collect())
    }

    async fn delete_by_ids(&self, ids: &[&str]) -> Result<MutationAck> {
        let mut store = self.documents.write().await;
        for id in ids {
            store.remove(*id);
        }
        Ok(new_mutation())
    }

    fn backend(&self) -> &str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_same_id() {
        let store = InMemoryVectorStore::new();
        store.upsert(&[StoredDocument::new("a", vec![1.0, 0.0])]).await.unwrap();
        store.upsert(&[StoredDocument::new("a", vec![0.0, 1.0])]).await.unwrap();
        assert_eq!(store.len().await, 1);
        let doc = store.get(&crate::content_id("a")).await.unwrap();
        assert_eq!(doc.vector, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_noop() {
        let store = InMemoryVectorStore::new();
        store.upsert(&[StoredDocument::new("a", vec![1.0])]).await.unwrap();
        let ack = store.delete_by_ids(&["missing"]).await.unwrap();
        assert!(ack.mutation_id.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn query_orders_by_similarity() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(&[
                StoredDocument::new("x-axis", vec![1.0, 0.0]),
                StoredDocument::new("diagonal", vec![1.0, 1.0]),
                StoredDocument::new("y-axis", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        let matches = store.query(&[1.0, 0.1], 2).await.unwrap();
        let texts: Vec<_> = matches.iter().filter_map(|m| m.text()).collect();
        assert_eq!(texts, vec!["x-axis", "diagonal"]);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let store = InMemoryVectorStore::with_dimensions(3);
        let err = store.upsert(&[StoredDocument::new("a", vec![1.0])]).await.unwrap_err();
        assert!(matches!(err, RagError::VectorStoreError { .. }));
        assert!(store.query(&[1.0, 2.0], 1).await.is_err());
        assert!(store.is_empty().await);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
