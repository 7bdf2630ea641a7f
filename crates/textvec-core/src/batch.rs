//! Host-side batching wrapper.
//!
//! Encoders implement a plain batch call; the host decides how large a
//! batch may actually reach the model. [`Batched`] decorates any
//! [`TextEncoder`] and splits oversized encode calls into chunks of at most
//! `max_batch_size` inputs, concatenating the per-chunk matrices back in
//! input order. The wrapped encoder never sees the chunking policy.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{EncoderError, EncoderResult};
use crate::traits::{EmbeddingMatrix, TextEncoder};

/// Chunking policy for [`Batched`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Largest batch forwarded to the wrapped encoder in one call.
    pub max_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_batch_size: 32 }
    }
}

impl BatchConfig {
    /// Fail fast on a policy that could never make progress.
    pub fn validate(&self) -> EncoderResult<()> {
        if self.max_batch_size == 0 {
            return Err(EncoderError::InvalidConfig(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Wrapper that enforces a maximum batch size on `encode` calls.
///
/// Transparent for every other operation: lifecycle hooks and capability
/// getters delegate to the wrapped encoder.
#[derive(Debug)]
pub struct Batched<E> {
    inner: E,
    config: BatchConfig,
}

impl<E: TextEncoder> Batched<E> {
    /// Wrap `inner` with the given chunking policy.
    pub fn new(inner: E, config: BatchConfig) -> EncoderResult<Self> {
        config.validate()?;
        Ok(Self { inner, config })
    }

    /// Access the wrapped encoder.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Unwrap, discarding the chunking policy.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

#[async_trait]
impl<E: TextEncoder> TextEncoder for Batched<E> {
    async fn initialize(&self) -> EncoderResult<()> {
        self.inner.initialize().await
    }

    async fn encode(&self, texts: &[String]) -> EncoderResult<EmbeddingMatrix> {
        if texts.is_empty() {
            return Err(EncoderError::EmptyInput);
        }
        if texts.len() <= self.config.max_batch_size {
            return self.inner.encode(texts).await;
        }

        let mut rows = Vec::with_capacity(texts.len());
        for (i, chunk) in texts.chunks(self.config.max_batch_size).enumerate() {
            debug!(chunk = i, len = chunk.len(), "encoding chunk");
            rows.extend(self.inner.encode(chunk).await?);
        }
        Ok(rows)
    }

    async fn persist(&self) -> EncoderResult<()> {
        self.inner.persist().await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn max_tokens(&self) -> usize {
        self.inner.max_tokens()
    }
}
