//! JSON request and response bodies of the HTTP API.
//!
//! Every response carries a boolean `success` flag. Missing request fields
//! deserialize as empty so they are rejected by the same validation as
//! explicitly empty values.

use serde::{Deserialize, Serialize};
use simstore_rag::SearchResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub confirm_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub success: bool,
    pub message: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { success: false, error: error.into() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_default_to_empty() {
        let store: StoreRequest = serde_json::from_value(json!({})).unwrap();
        assert!(store.text.is_empty());

        let search: SearchRequest = serde_json::from_value(json!({"query": "q"})).unwrap();
        assert_eq!(search.limit, None);

        let delete: DeleteRequest = serde_json::from_value(json!({"id": "abc", "confirmToken": "t"})).unwrap();
        assert_eq!(delete.confirm_token.as_deref(), Some("t"));
    }

    #[test]
    fn responses_use_camel_case_and_skip_absent_mutation_ids() {
        let body = serde_json::to_value(StoreResponse {
            success: true,
            message: "ok".into(),
            id: "abc".into(),
            mutation_id: Some("m".into()),
        })
        .unwrap();
        assert_eq!(body, json!({"success": true, "message": "ok", "id": "abc", "mutationId": "m"}));

        let body = serde_json::to_value(DeleteResponse { success: true, message: "gone".into(), mutation_id: None })
            .unwrap();
        assert_eq!(body, json!({"success": true, "message": "gone"}));
    }
}
