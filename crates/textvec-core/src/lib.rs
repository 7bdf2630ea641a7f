//! Core contract for text encoder plugins.
//!
//! This crate defines the interface the hosting pipeline dictates to every
//! encoder implementation, independent of any particular model backend:
//!
//! - **TextEncoder**: trait with the post-construction initializer, the
//!   batch encode call, and the state-capture hook
//! - **Batched**: host-side wrapper that chunks large encode calls
//! - **EncoderError**: shared error taxonomy
//!
//! # Example
//!
//! ```rust,ignore
//! use textvec_core::{Batched, BatchConfig, TextEncoder};
//!
//! async fn run(encoder: impl TextEncoder) -> textvec_core::EncoderResult<()> {
//!     let encoder = Batched::new(encoder, BatchConfig::default())?;
//!     encoder.initialize().await?;
//!     let rows = encoder.encode(&["hello".to_string()]).await?;
//!     assert_eq!(rows.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod error;
pub mod traits;

pub use batch::{BatchConfig, Batched};
pub use error::{EncoderError, EncoderResult};
pub use traits::{EmbeddingMatrix, TextEncoder};
