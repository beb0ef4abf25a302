//! Configuration for the document indexer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Number of results returned by a search that does not specify a limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Upper bound applied to caller-supplied search limits.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Default bound on each embedding or vector store call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration parameters for the [`DocumentIndexer`](crate::DocumentIndexer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexerConfig {
    /// Number of results when a search omits its limit.
    pub default_limit: usize,
    /// Larger limits are clamped to this value.
    pub max_limit: usize,
    /// Timeout applied to every upstream call.
    pub upstream_timeout: Duration,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SEARCH_LIMIT,
            max_limit: MAX_SEARCH_LIMIT,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

impl IndexerConfig {
    /// Create a new builder for constructing an [`IndexerConfig`].
    pub fn builder() -> IndexerConfigBuilder {
        IndexerConfigBuilder::default()
    }

    /// Resolve a caller-supplied limit: default when absent, clamped to `max_limit`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] for a limit of zero.
    pub fn resolve_limit(&self, requested: Option<usize>) -> Result<usize> {
        match requested {
            None => Ok(self.default_limit),
            Some(0) => Err(RagError::InvalidArgument("limit must be greater than zero".to_string())),
            Some(n) => Ok(n.min(self.max_limit)),
        }
    }
}

/// Builder for constructing a validated [`IndexerConfig`].
#[derive(Debug, Clone, Default)]
pub struct IndexerConfigBuilder {
    config: IndexerConfig,
}

impl IndexerConfigBuilder {
    /// Set the limit used when a search does not specify one.
    pub fn default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    /// Set the cap applied to search limits.
    pub fn max_limit(mut self, limit: usize) -> Self {
        self.config.max_limit = limit;
        self
    }

    /// Set the timeout applied to each upstream call.
    pub fn upstream_timeout(mut self, timeout: Duration) -> Self {
        self.config.upstream_timeout = timeout;
        self
    }

    /// Build the [`IndexerConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `max_limit == 0`
    /// - `default_limit` is zero or exceeds `max_limit`
    /// - `upstream_timeout` is zero
    pub fn build(self) -> Result<IndexerConfig> {
        let config = self.config;
        if config.max_limit == 0 {
            return Err(RagError::ConfigError("max_limit must be greater than zero".to_string()));
        }
        if config.default_limit == 0 || config.default_limit > config.max_limit {
            return Err(RagError::ConfigError(format!(
                "default_limit ({}) must be between 1 and max_limit ({})",
                config.default_limit, config.max_limit
            )));
        }
        if config.upstream_timeout.is_zero() {
            return Err(RagError::ConfigError("upstream_timeout must be non-zero".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = IndexerConfig::builder().build().unwrap();
        assert_eq!(config, IndexerConfig::default());
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.max_limit, 100);
    }

    #[test]
    fn rejects_inconsistent_limits() {
        assert!(IndexerConfig::builder().max_limit(0).build().is_err());
        assert!(IndexerConfig::builder().default_limit(0).build().is_err());
        assert!(IndexerConfig::builder().default_limit(20).max_limit(10).build().is_err());
        assert!(IndexerConfig::builder().upstream_timeout(Duration::ZERO).build().is_err());
    }

    #[test]
    fn resolve_limit_defaults_and_clamps() {
        let config = IndexerConfig::builder().max_limit(10).build().unwrap();
        assert_eq!(config.resolve_limit(None).unwrap(), 5);
        assert_eq!(config.resolve_limit(Some(3)).unwrap(), 3);
        assert_eq!(config.resolve_limit(Some(500)).unwrap(), 10);
        assert!(matches!(config.resolve_limit(Some(0)), Err(RagError::InvalidArgument(_))));
    }
}
