use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::server::AppState;

/// Reject requests whose `Authorization` header does not equal the API secret.
///
/// The whole header value is the credential; no `Bearer ` prefix is
/// stripped. Runs before the body is read, so rejected requests cause no
/// embedding or index calls.
pub async fn require_credential(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok());
    state.indexer.gate().authorize(credential)?;
    Ok(next.run(req).await)
}
