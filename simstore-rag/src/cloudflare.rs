//! Cloudflare Workers AI embeddings and Vectorize index over the REST API.
//!
//! This module is only available when the `cloudflare` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use simstore_rag::cloudflare::{CloudflareAccount, VectorizeStore, WorkersAiEmbeddingProvider};
//!
//! let account = CloudflareAccount::new(account_id, api_token)?;
//! let embedder = WorkersAiEmbeddingProvider::new(account.clone());
//! let store = VectorizeStore::new(account, "documents")?;
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::{MutationAck, QueryMatch, StoredDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Base URL of the Cloudflare v4 API.
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// The default Workers AI embedding model.
pub const DEFAULT_WORKERS_AI_MODEL: &str = "@cf/baai/bge-base-en-v1.5";

/// Dimensionality of [`DEFAULT_WORKERS_AI_MODEL`].
pub const DEFAULT_WORKERS_AI_DIMENSIONS: usize = 768;

/// Vectorize's `topK` ceiling when metadata is returned.
pub const VECTORIZE_MAX_TOP_K: usize = 20;

const WORKERS_AI: &str = "WorkersAI";
const VECTORIZE: &str = "Vectorize";

/// Account credentials shared by the Workers AI and Vectorize clients.
#[derive(Clone)]
pub struct CloudflareAccount {
    client: reqwest::Client,
    account_id: String,
    api_token: String,
    api_base: String,
}

impl std::fmt::Debug for CloudflareAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareAccount")
            .field("account_id", &self.account_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl CloudflareAccount {
    /// Create account credentials from an account id and API token.
    pub fn new(account_id: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        let account_id = account_id.into();
        let api_token = api_token.into();
        if account_id.is_empty() || api_token.is_empty() {
            return Err(RagError::ConfigError(
                "Cloudflare account id and API token must not be empty".to_string(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            account_id,
            api_token,
            api_base: CLOUDFLARE_API_BASE.to_string(),
        })
    }

    /// Point the clients at a different API base (e.g. a proxy).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/accounts/{}/{}", self.api_base.trim_end_matches('/'), self.account_id, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        fail: impl Fn(String) -> RagError,
    ) -> Result<T> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| fail(format!("request failed: {e}")))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| fail(format!("failed to read response: {e}")))?;
        unwrap_envelope(status, &body).map_err(fail)
    }
}

// ── Cloudflare API envelope ────────────────────────────────────────

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

/// Extract `result` from a Cloudflare response, or describe why it failed.
fn unwrap_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> std::result::Result<T, String> {
    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(format!("failed to parse response: {e}")),
        Err(_) => return Err(format!("API returned {status}")),
    };
    if !status.is_success() || !envelope.success {
        let detail = envelope
            .errors
            .iter()
            .map(|e| format!("[{}] {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(format!("API returned {status}: {detail}"));
    }
    envelope.result.ok_or_else(|| "response has no result".to_string())
}

// ── Workers AI embeddings ──────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by a Workers AI text-embedding model.
#[derive(Debug, Clone)]
pub struct WorkersAiEmbeddingProvider {
    account: CloudflareAccount,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    text: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbeddingResult {
    #[serde(default)]
    data: Vec<Vec<f32>>,
}

impl WorkersAiEmbeddingProvider {
    /// Use the default model (`@cf/baai/bge-base-en-v1.5`, 768 dimensions).
    pub fn new(account: CloudflareAccount) -> Self {
        Self {
            account,
            model: DEFAULT_WORKERS_AI_MODEL.to_string(),
            dimensions: DEFAULT_WORKERS_AI_DIMENSIONS,
        }
    }

    /// Use another embedding model with its output dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    fn fail(message: String) -> RagError {
        RagError::EmbeddingError { provider: WORKERS_AI.to_string(), message }
    }
}

#[async_trait]
impl EmbeddingProvider for WorkersAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = WORKERS_AI, model = %self.model, text_len = text.len(), "embedding text");

        let url = self.account.url(&format!("ai/run/{}", self.model));
        let request = self.account.client.post(url).json(&EmbeddingRequest { text: [text] });
        let result: EmbeddingResult = self.account.send(request, Self::fail).await?;

        result.data.into_iter().next().ok_or_else(|| Self::fail("response contained no vectors".into()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        WORKERS_AI
    }
}

// ── Vectorize index ────────────────────────────────────────────────

/// A [`VectorStore`] backed by a Cloudflare Vectorize (v2) index.
///
/// The index must already exist with the embedding provider's dimension.
/// Queries never request vector values; payloads are returned as metadata.
#[derive(Debug, Clone)]
pub struct VectorizeStore {
    account: CloudflareAccount,
    index: String,
}

#[derive(Serialize)]
struct VectorizeRecord<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    return_values: bool,
    return_metadata: &'static str,
}

#[derive(Deserialize)]
struct QueryResult {
    #[serde(default)]
    matches: Vec<VectorizeMatch>,
}

#[derive(Deserialize)]
struct VectorizeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationResult {
    #[serde(default)]
    mutation_id: Option<String>,
}

impl From<MutationResult> for MutationAck {
    fn from(result: MutationResult) -> Self {
        MutationAck { mutation_id: result.mutation_id }
    }
}

/// Encode documents as the newline-delimited JSON Vectorize expects.
fn ndjson_body(documents: &[StoredDocument]) -> Result<String> {
    let mut body = String::new();
    for doc in documents {
        let record = VectorizeRecord { id: &doc.id, values: &doc.vector, metadata: doc.payload() };
        let line = serde_json::to_string(&record).map_err(|e| VectorizeStore::fail(e.to_string()))?;
        body.push_str(&line);
        body.push('\n');
    }
    Ok(body)
}

impl VectorizeStore {
    /// Bind to the named Vectorize index.
    pub fn new(account: CloudflareAccount, index: impl Into<String>) -> Result<Self> {
        let index = index.into();
        if index.is_empty() {
            return Err(RagError::ConfigError("Vectorize index name must not be empty".to_string()));
        }
        Ok(Self { account, index })
    }

    fn url(&self, operation: &str) -> String {
        self.account.url(&format!("vectorize/v2/indexes/{}/{operation}", self.index))
    }

    fn fail(message: String) -> RagError {
        RagError::VectorStoreError { backend: VECTORIZE.to_string(), message }
    }
}

#[async_trait]
impl VectorStore for VectorizeStore {
    async fn upsert(&self, documents: &[StoredDocument]) -> Result<MutationAck> {
        if documents.is_empty() {
            return Ok(MutationAck::default());
        }
        let request = self
            .account
            .client
            .post(self.url("upsert"))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(ndjson_body(documents)?);
        let result: MutationResult = self.account.send(request, Self::fail).await?;
        debug!(index = %self.index, count = documents.len(), "upserted vectors");
        Ok(result.into())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let top_k = top_k.min(VECTORIZE_MAX_TOP_K);
        let body = QueryRequest {
            vector: embedding,
            top_k,
            return_values: false,
            return_metadata: "all",
        };
        let request = self.account.client.post(self.url("query")).json(&body);
        let result: QueryResult = self.account.send(request, Self::fail).await?;
        debug!(index = %self.index, top_k, matches = result.matches.len(), "queried vectors");

        Ok(result
            .matches
            .into_iter()
            .map(|m| QueryMatch { id: m.id, score: m.score, payload: m.metadata })
            .collect())
    }

    async fn delete_by_ids(&self, ids: &[&str]) -> Result<MutationAck> {
        if ids.is_empty() {
            return Ok(MutationAck::default());
        }
        let request = self.account.client.post(self.url("delete_by_ids")).json(&DeleteRequest { ids });
        let result: MutationResult = self.account.send(request, Self::fail).await?;
        debug!(index = %self.index, count = ids.len(), "deleted vectors");
        Ok(result.into())
    }

    fn backend(&self) -> &str {
        VECTORIZE
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn account() -> CloudflareAccount {
        CloudflareAccount::new("acct", "token").unwrap().with_api_base("https://example.test/v4/")
    }

    #[test]
    fn urls_follow_the_api_layout() {
        let store = VectorizeStore::new(account(), "docs").unwrap();
        assert_eq!(
            store.url("delete_by_ids"),
            "https://example.test/v4/accounts/acct/vectorize/v2/indexes/docs/delete_by_ids"
        );
        assert_eq!(
            account().url("ai/run/@cf/baai/bge-base-en-v1.5"),
            "https://example.test/v4/accounts/acct/ai/run/@cf/baai/bge-base-en-v1.5"
        );
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(CloudflareAccount::new("", "token").is_err());
        assert!(CloudflareAccount::new("acct", "").is_err());
        assert!(VectorizeStore::new(account(), "").is_err());
    }

    #[test]
    fn debug_hides_the_token() {
        let rendered = format!("{:?}", account());
        assert!(!rendered.contains("token"));
    }

    #[test]
    fn ndjson_has_one_record_per_line() {
        let docs = [StoredDocument::new("one", vec![0.5, 1.0]), StoredDocument::new("two", vec![0.0, 0.0])];
        let body = ndjson_body(&docs).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, json!({"id": docs[0].id, "values": [0.5, 1.0], "metadata": {"text": "one"}}));
    }

    #[test]
    fn query_request_never_asks_for_values() {
        let body = serde_json::to_value(QueryRequest {
            vector: &[0.1],
            top_k: 3,
            return_values: false,
            return_metadata: "all",
        })
        .unwrap();
        assert_eq!(body, json!({"vector": [0.1f32], "topK": 3, "returnValues": false, "returnMetadata": "all"}));
    }

    #[test]
    fn envelope_success_yields_result() {
        let body = r#"{"success":true,"errors":[],"messages":[],"result":{"mutationId":"m-1"}}"#;
        let result: MutationResult = unwrap_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(MutationAck::from(result), MutationAck::new("m-1"));
    }

    #[test]
    fn envelope_errors_are_reported() {
        let body = r#"{"success":false,"errors":[{"code":40006,"message":"vector dimension mismatch"}],"result":null}"#;
        let err = unwrap_envelope::<MutationResult>(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert!(err.contains("40006"));
        assert!(err.contains("vector dimension mismatch"));

        let err = unwrap_envelope::<MutationResult>(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(err.contains("502"));
    }

    #[test]
    fn query_matches_keep_order_and_metadata() {
        let body = r#"{"success":true,"errors":[],"result":{"count":2,"matches":[
            {"id":"b","score":0.9,"metadata":{"text":"second"}},
            {"id":"a","score":0.4}
        ]}}"#;
        let result: QueryResult = unwrap_envelope(StatusCode::OK, body).unwrap();
        let ids: Vec<_> = result.matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert!(result.matches[1].metadata.is_none());
    }

    #[test]
    fn embedding_result_parses_data_rows() {
        let body = r#"{"success":true,"errors":[],"result":{"shape":[1,3],"data":[[0.1,0.2,0.3]]}}"#;
        let result: EmbeddingResult = unwrap_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(result.data, vec![vec![0.1, 0.2, 0.3]]);
    }
}
