//! Command-line and environment configuration for the `simstore` binary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use simstore_auth::AccessGate;
use simstore_rag::cloudflare::{
    CloudflareAccount, DEFAULT_WORKERS_AI_DIMENSIONS, VectorizeStore, WorkersAiEmbeddingProvider,
};
use simstore_rag::openai::{DEFAULT_OPENAI_DIMENSIONS, OpenAiEmbeddingProvider};
use simstore_rag::{
    DocumentIndexer, EmbeddingProvider, InMemoryVectorStore, IndexerConfig, MockEmbeddingProvider,
    VectorStore, config,
};
use simstore_telemetry::{LogFormat, TelemetryConfig};

use crate::server::{AppState, DEFAULT_MAX_BODY_BYTES, ServerConfig};

/// Dimensions reported by the mock embedder when no override is given.
const MOCK_DIMENSIONS: usize = 768;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmbeddingBackend {
    /// Cloudflare Workers AI.
    WorkersAi,
    /// OpenAI or a compatible server.
    #[value(name = "openai")]
    OpenAi,
    /// Deterministic hash-derived vectors, no network.
    Mock,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum IndexBackend {
    /// Cloudflare Vectorize.
    Vectorize,
    /// Process-local index, lost on restart.
    Memory,
}

/// Content-addressed text store over HTTP.
#[derive(Parser, Clone)]
#[command(name = "simstore", version, about = "Content-addressed text store with similarity search")]
pub struct ServerSettings {
    /// Address to bind.
    #[arg(long, env = "SIMSTORE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "SIMSTORE_PORT", default_value_t = 8787)]
    pub port: u16,

    /// Expected value of the `Authorization` header.
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: String,

    /// Token required to delete; defaults to the auth token.
    #[arg(long, env = "CONFIRM_TOKEN", hide_env_values = true)]
    pub confirm_token: Option<String>,

    #[arg(long, env = "SIMSTORE_EMBEDDING", value_enum, default_value_t = EmbeddingBackend::WorkersAi)]
    pub embedding: EmbeddingBackend,

    #[arg(long, env = "SIMSTORE_INDEX", value_enum, default_value_t = IndexBackend::Vectorize)]
    pub index: IndexBackend,

    #[arg(long, env = "CLOUDFLARE_ACCOUNT_ID")]
    pub cloudflare_account_id: Option<String>,

    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub cloudflare_api_token: Option<String>,

    /// Vectorize index name.
    #[arg(long, env = "VECTORIZE_INDEX")]
    pub vectorize_index: Option<String>,

    /// Embedding model; requires `--embedding-dimensions` for non-default models.
    #[arg(long, env = "SIMSTORE_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    #[arg(long, env = "SIMSTORE_EMBEDDING_DIMENSIONS")]
    pub embedding_dimensions: Option<usize>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// Results returned when a search gives no limit.
    #[arg(long, env = "SIMSTORE_DEFAULT_LIMIT", default_value_t = config::DEFAULT_SEARCH_LIMIT)]
    pub default_limit: usize,

    /// Upper bound applied to requested limits.
    #[arg(long, env = "SIMSTORE_MAX_LIMIT", default_value_t = config::MAX_SEARCH_LIMIT)]
    pub max_limit: usize,

    /// Seconds allowed for each embedding or index call.
    #[arg(long, env = "SIMSTORE_UPSTREAM_TIMEOUT_SECS", default_value_t = config::DEFAULT_UPSTREAM_TIMEOUT.as_secs())]
    pub upstream_timeout_secs: u64,

    #[arg(long, env = "SIMSTORE_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    #[arg(long, env = "SIMSTORE_LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,

    /// Filter directive used when `RUST_LOG` is unset.
    #[arg(long, env = "SIMSTORE_LOG_FILTER", default_value = "info")]
    pub log_filter: String,
}

impl std::fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("ServerSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth_token", &"***")
            .field("confirm_token", &redacted(&self.confirm_token))
            .field("embedding", &self.embedding)
            .field("index", &self.index)
            .field("cloudflare_account_id", &self.cloudflare_account_id)
            .field("cloudflare_api_token", &redacted(&self.cloudflare_api_token))
            .field("vectorize_index", &self.vectorize_index)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_dimensions", &self.embedding_dimensions)
            .field("openai_api_key", &redacted(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("default_limit", &self.default_limit)
            .field("max_limit", &self.max_limit)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("log_format", &self.log_format)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

impl ServerSettings {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            max_body_bytes: self.max_body_bytes,
        }
    }

    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig::new("simstore")
            .with_filter(self.log_filter.clone())
            .with_format(self.log_format)
    }

    pub fn indexer_config(&self) -> Result<IndexerConfig> {
        IndexerConfig::builder()
            .default_limit(self.default_limit)
            .max_limit(self.max_limit)
            .upstream_timeout(Duration::from_secs(self.upstream_timeout_secs))
            .build()
            .context("invalid indexer settings")
    }

    pub fn access_gate(&self) -> Result<AccessGate> {
        let gate = AccessGate::new(self.auth_token.clone()).context("AUTH_TOKEN")?;
        match &self.confirm_token {
            Some(token) => gate.with_confirm_secret(token.clone()).context("CONFIRM_TOKEN"),
            None => Ok(gate),
        }
    }

    pub fn build_state(&self) -> Result<AppState> {
        Ok(AppState::new(self.build_indexer()?))
    }

    pub fn build_indexer(&self) -> Result<DocumentIndexer> {
        let embedder = self.embedding_provider()?;
        let store = self.vector_store(embedder.dimensions())?;
        DocumentIndexer::builder()
            .config(self.indexer_config()?)
            .access_gate(self.access_gate()?)
            .embedding_provider(embedder)
            .vector_store(store)
            .build()
            .context("failed to assemble document indexer")
    }

    fn cloudflare_account(&self) -> Result<CloudflareAccount> {
        let account_id = self
            .cloudflare_account_id
            .clone()
            .ok_or_else(|| anyhow!("CLOUDFLARE_ACCOUNT_ID is required for Cloudflare backends"))?;
        let api_token = self
            .cloudflare_api_token
            .clone()
            .ok_or_else(|| anyhow!("CLOUDFLARE_API_TOKEN is required for Cloudflare backends"))?;
        Ok(CloudflareAccount::new(account_id, api_token)?)
    }

    fn embedding_provider(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        let provider: Arc<dyn EmbeddingProvider> = match self.embedding {
            EmbeddingBackend::WorkersAi => {
                let provider = WorkersAiEmbeddingProvider::new(self.cloudflare_account()?);
                match &self.embedding_model {
                    Some(model) => Arc::new(provider.with_model(
                        model.clone(),
                        self.embedding_dimensions.unwrap_or(DEFAULT_WORKERS_AI_DIMENSIONS),
                    )),
                    None => Arc::new(provider),
                }
            }
            EmbeddingBackend::OpenAi => {
                let key = self
                    .openai_api_key
                    .clone()
                    .ok_or_else(|| anyhow!("OPENAI_API_KEY is required for the openai embedding backend"))?;
                let mut provider = OpenAiEmbeddingProvider::new(key)?;
                if let Some(base_url) = &self.openai_base_url {
                    provider = provider.with_base_url(base_url.clone());
                }
                if let Some(model) = &self.embedding_model {
                    provider = provider.with_model(
                        model.clone(),
                        self.embedding_dimensions.unwrap_or(DEFAULT_OPENAI_DIMENSIONS),
                    );
                } else if let Some(dims) = self.embedding_dimensions {
                    provider = provider.with_dimensions(dims);
                }
                Arc::new(provider)
            }
            EmbeddingBackend::Mock => Arc::new(MockEmbeddingProvider::new(
                self.embedding_dimensions.unwrap_or(MOCK_DIMENSIONS),
            )),
        };
        Ok(provider)
    }

    fn vector_store(&self, dimensions: usize) -> Result<Arc<dyn VectorStore>> {
        let store: Arc<dyn VectorStore> = match self.index {
            IndexBackend::Vectorize => {
                let index = self
                    .vectorize_index
                    .clone()
                    .ok_or_else(|| anyhow!("VECTORIZE_INDEX is required for the vectorize backend"))?;
                Arc::new(VectorizeStore::new(self.cloudflare_account()?, index)?)
            }
            IndexBackend::Memory => Arc::new(InMemoryVectorStore::with_dimensions(dimensions)),
        };
        Ok(store)
    }
}
