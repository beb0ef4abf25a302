//! Deterministic embedding provider for tests and local development.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Embed,
    Fail,
    Stall(Duration),
}

/// Embeds text into a hash-derived, L2-normalised vector.
///
/// Identical text always produces the identical vector, so a stored text is
/// its own nearest neighbour. The provider counts calls, which lets tests
/// assert that rejected requests never reach the embedding backend.
#[derive(Debug)]
pub struct MockEmbeddingProvider {
    dimensions: usize,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockEmbeddingProvider {
    /// A provider producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, behavior: Behavior::Embed, calls: AtomicUsize::new(0) }
    }

    /// A provider whose every call fails with an embedding error.
    pub fn failing(dimensions: usize) -> Self {
        Self { behavior: Behavior::Fail, ..Self::new(dimensions) }
    }

    /// A provider that waits `delay` before answering.
    pub fn stalled(dimensions: usize, delay: Duration) -> Self {
        Self { behavior: Behavior::Stall(delay), ..Self::new(dimensions) }
    }

    /// Number of `embed` calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        let mut v: Vec<f32> = (0..self.dimensions as u64)
            .map(|i| {
                // splitmix64 finaliser, so each component is decorrelated
                let mut z = hash ^ i.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
                z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
                z ^= z >> 31;
                ((z >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
            })
            .collect();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Embed => Ok(self.vector_for(text)),
            Behavior::Fail => Err(RagError::EmbeddingError {
                provider: self.name().to_string(),
                message: "simulated provider outage".to_string(),
            }),
            Behavior::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Ok(self.vector_for(text))
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "Mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_same_vector() {
        let provider = MockEmbeddingProvider::new(16);
        let a = provider.embed("hello").await.unwrap();
        let b = provider.embed("hello").await.unwrap();
        let c = provider.embed("goodbye").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_provider_errors() {
        let provider = MockEmbeddingProvider::failing(8);
        let err = provider.embed("x").await.unwrap_err();
        assert!(err.is_upstream());
        assert_eq!(provider.call_count(), 1);
    }
}
