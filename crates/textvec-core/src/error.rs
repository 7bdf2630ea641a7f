//! Error types shared by encoder plugins.

use thiserror::Error;

/// Errors surfaced by encoder implementations and host-side wrappers.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// Model name is not a member of the supported registry.
    #[error("unknown model name '{name}': not in the supported registry")]
    UnknownModel { name: String },

    /// Loading model or tokenizer artifacts failed.
    #[error("failed to load model artifacts: {0}")]
    ModelLoad(String),

    /// Text-to-ids conversion failed.
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// Forward pass or tensor conversion failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Encoder used before its initializer hook ran.
    #[error("encoder not initialized: call initialize() first")]
    NotInitialized,

    /// Encode called with an empty batch.
    #[error("empty input batch")]
    EmptyInput,

    /// Writing model state to the work directory failed.
    #[error("failed to persist encoder state: {0}")]
    Persist(String),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for encoder operations.
pub type EncoderResult<T> = Result<T, EncoderError>;
