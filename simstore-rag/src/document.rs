//! Data types for stored documents, index records, and search results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::content_id;

/// Payload key under which the original text is stored in the index.
pub const TEXT_PAYLOAD_KEY: &str = "text";

/// Text reported for a match whose payload lost its original text.
pub const MISSING_TEXT_SENTINEL: &str = "Not found";

/// A text document addressed by the digest of its content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredDocument {
    /// Content identifier derived from `text`.
    pub id: String,
    /// The original text.
    pub text: String,
    /// Embedding of `text`.
    pub vector: Vec<f32>,
}

impl StoredDocument {
    /// Build a document, deriving its identifier from `text`.
    pub fn new(text: impl Into<String>, vector: Vec<f32>) -> Self {
        let text = text.into();
        Self { id: content_id(&text), text, vector }
    }

    /// The payload persisted alongside the vector.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(TEXT_PAYLOAD_KEY.to_string(), Value::String(self.text.clone()));
        payload
    }
}

/// A nearest-neighbour match returned by a [`VectorStore`](crate::VectorStore).
///
/// Vector values are never requested from the store, so a match carries only
/// its identifier, score, and payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryMatch {
    /// Identifier of the matched entry.
    pub id: String,
    /// Similarity score (higher is more similar).
    pub score: f32,
    /// Stored payload, if the backend returned one.
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
}

impl QueryMatch {
    /// The stored text, if present in the payload as a string.
    pub fn text(&self) -> Option<&str> {
        self.payload.as_ref()?.get(TEXT_PAYLOAD_KEY)?.as_str()
    }
}

/// A search hit as reported to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    /// Content identifier of the matched document.
    pub id: String,
    /// The stored text, or [`MISSING_TEXT_SENTINEL`].
    pub text: String,
}

impl From<QueryMatch> for SearchResult {
    fn from(m: QueryMatch) -> Self {
        let text = m.text().unwrap_or(MISSING_TEXT_SENTINEL).to_string();
        Self { id: m.id, text }
    }
}

/// Acknowledgment of an index mutation.
///
/// The mutation id is opaque and only passed through for traceability.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationAck {
    /// Backend-assigned mutation identifier, when the backend provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutation_id: Option<String>,
}

impl MutationAck {
    /// An acknowledgment carrying the given mutation id.
    pub fn new(mutation_id: impl Into<String>) -> Self {
        Self { mutation_id: Some(mutation_id.into()) }
    }
}

/// Outcome of storing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReceipt {
    /// Identifier assigned to the text.
    pub id: String,
    /// The index's acknowledgment of the upsert.
    pub ack: MutationAck,
}
