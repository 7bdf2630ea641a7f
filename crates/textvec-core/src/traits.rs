//! Encoder plugin trait definition.

use async_trait::async_trait;

use crate::error::EncoderResult;

/// Dense representations for a batch: one row per input, in input order.
pub type EmbeddingMatrix = Vec<Vec<f32>>;

/// Trait every text encoder plugin must implement.
///
/// The hosting pipeline drives the lifecycle:
///
/// 1. construct the encoder (cheap, no heavy resources),
/// 2. call [`initialize`](TextEncoder::initialize) exactly once,
/// 3. call [`encode`](TextEncoder::encode) any number of times,
/// 4. call [`persist`](TextEncoder::persist) before capturing state.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the host can share them across
/// async tasks.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Post-construction hook, invoked once by the host before first use.
    ///
    /// Heavy resources (weights, vocabularies) are acquired here, never in
    /// the constructor.
    async fn initialize(&self) -> EncoderResult<()> {
        Ok(())
    }

    /// Encode an ordered batch of strings into a matrix of dense vectors.
    ///
    /// Row `i` of the output corresponds to `texts[i]`. An empty batch is
    /// `EncoderError::EmptyInput`.
    async fn encode(&self, texts: &[String]) -> EncoderResult<EmbeddingMatrix>;

    /// State-capture hook, invoked by the host before snapshotting the
    /// encoder, so a later [`initialize`](TextEncoder::initialize) in a
    /// fresh process can restore without re-acquiring remote resources.
    async fn persist(&self) -> EncoderResult<()> {
        Ok(())
    }

    /// The model identifier this encoder was constructed with.
    fn model_name(&self) -> &str;

    /// Width of each output row.
    fn dimension(&self) -> usize;

    /// Maximum input token count the model accepts.
    fn max_tokens(&self) -> usize;
}
