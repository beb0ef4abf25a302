//! Mapping of service errors onto HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use simstore_auth::AuthError;
use simstore_rag::RagError;
use thiserror::Error;
use tracing::error;

use crate::protocol::ErrorResponse;

/// An error reported to API callers.
///
/// Upstream failures carry only the operation name; provider detail is
/// logged by the indexer and never serialized.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: invalid confirmation token")]
    Forbidden,

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("{operation} failed")]
    Upstream { operation: &'static str },

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream { .. } | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert an indexer error raised while running `operation`.
    pub fn from_rag(operation: &'static str, err: RagError) -> Self {
        match err {
            RagError::InvalidArgument(message) => ApiError::InvalidArgument(message),
            RagError::Auth(auth) => auth.into(),
            err if err.is_upstream() => ApiError::Upstream { operation },
            err => {
                error!(operation, error = %err, "unexpected indexer error");
                ApiError::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden => ApiError::Forbidden,
            AuthError::Unauthorized => ApiError::Unauthorized,
            AuthError::InvalidSecret(message) => {
                error!(%message, "access gate misconfigured");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge;
        }
        ApiError::InvalidArgument(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(ApiError::InvalidArgument("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ApiError::Upstream { operation: "store" }.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_detail_is_not_exposed() {
        let err = ApiError::from_rag(
            "search",
            RagError::VectorStoreError { backend: "Vectorize".into(), message: "token abc123 rejected".into() },
        );
        assert!(matches!(err, ApiError::Upstream { operation: "search" }));
        assert_eq!(err.to_string(), "search failed");

        let timeout = ApiError::from_rag(
            "store",
            RagError::Timeout { operation: "embedding", after: Duration::from_secs(1) },
        );
        assert_eq!(timeout.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_errors_keep_their_distinction() {
        assert!(matches!(ApiError::from_rag("delete", AuthError::Forbidden.into()), ApiError::Forbidden));
        assert!(matches!(ApiError::from(AuthError::Unauthorized), ApiError::Unauthorized));
    }
}
