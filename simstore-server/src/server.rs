use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use simstore_rag::DocumentIndexer;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    error::ApiError,
    middleware::require_credential,
    protocol::{
        DeleteRequest, DeleteResponse, SearchRequest, SearchResponse, StoreRequest, StoreResponse,
    },
};

/// Default cap on request body size.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub indexer: Arc<DocumentIndexer>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(indexer: DocumentIndexer) -> Self {
        Self { indexer: Arc::new(indexer) }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Build the router: gated document routes plus an open health probe.
///
/// CORS wraps the gate so preflight requests are answered without a
/// credential. The body limit is enforced by the JSON extractor, which only
/// runs once the credential has been accepted.
pub fn app_router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let documents = Router::new()
        .route("/store", post(store))
        .route("/search", post(search))
        .route("/delete", post(delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_credential))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    Router::new()
        .route("/health", get(health))
        .merge(documents)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = app_router(state, config.max_body_bytes);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for simstore server")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("simstore listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({"status":"ok","service":"simstore"}))
}

async fn store(
    State(state): State<AppState>,
    body: Result<Json<StoreRequest>, JsonRejection>,
) -> Result<Json<StoreResponse>, ApiError> {
    let Json(request) = body?;
    let receipt = state
        .indexer
        .store(&request.text)
        .await
        .map_err(|e| ApiError::from_rag("store", e))?;

    Ok(Json(StoreResponse {
        success: true,
        message: "text stored successfully".to_string(),
        id: receipt.id,
        mutation_id: receipt.ack.mutation_id,
    }))
}

async fn search(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = body?;
    let results = state
        .indexer
        .search(&request.query, request.limit)
        .await
        .map_err(|e| ApiError::from_rag("search", e))?;

    Ok(Json(SearchResponse { success: true, results }))
}

async fn delete(
    State(state): State<AppState>,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Json(request) = body?;
    let ack = state
        .indexer
        .delete(&request.id, request.confirm_token.as_deref())
        .await
        .map_err(|e| ApiError::from_rag("delete", e))?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "document deleted successfully".to_string(),
        mutation_id: ack.mutation_id,
    }))
}
