//! Pretrained transformer text encoders.
//!
//! This crate adapts pretrained transformer language models into the
//! [`textvec_core::TextEncoder`] plugin contract. Model architectures,
//! weight formats and tokenization are delegated to Candle and the
//! HuggingFace `tokenizers` crate; this crate is the glue:
//!
//! - **registry**: the closed set of supported model configurations
//! - **artifacts**: resolving config/tokenizer/weights from the work
//!   directory or, on fallback, from the remote hub
//! - **backend**: construction and forward dispatch per architecture class
//! - **encoder**: the [`TransformerEncoder`] adapter itself
//!
//! # Example
//!
//! ```rust,ignore
//! use textvec_core::TextEncoder;
//! use textvec_transformers::{EncoderConfig, TransformerEncoder};
//!
//! async fn run() -> textvec_core::EncoderResult<()> {
//!     let encoder = TransformerEncoder::new(EncoderConfig::default())?;
//!     encoder.initialize().await?;
//!     let rows = encoder.encode(&["a sentence".to_string()]).await?;
//!     assert_eq!(rows[0].len(), encoder.dimension());
//!     Ok(())
//! }
//! ```

pub mod artifacts;
pub mod backend;
pub mod config;
pub mod encoder;
mod padding;
pub mod pooling;
pub mod registry;

pub use artifacts::ModelArtifacts;
pub use config::{DeviceKind, EncoderConfig};
pub use encoder::TransformerEncoder;
pub use pooling::Pooling;
pub use registry::{ModelArch, ModelKind, ModelSpec};
