//! CLI command handlers.
//!
//! # Modules
//!
//! - `models`: print the supported model registry
//! - `fetch`: warm a work directory with model artifacts
//! - `encode`: encode texts and print vectors as JSON

pub mod encode;
pub mod fetch;
pub mod models;

use std::path::PathBuf;

use clap::Args;

use textvec_transformers::{DeviceKind, EncoderConfig};

/// Encoder selection shared by `fetch` and `encode`.
#[derive(Args, Debug)]
pub struct EncoderArgs {
    /// Registry key of the model to use
    #[arg(long, default_value = "bert-base-uncased")]
    pub model: String,

    /// Work directory: preferred load source and persistence target
    #[arg(long, default_value = "models/encoder")]
    pub work_dir: PathBuf,

    /// Use a CUDA device (falls back to CPU with a warning)
    #[arg(long)]
    pub cuda: bool,
}

impl EncoderArgs {
    /// Build the encoder configuration, with environment overrides
    /// applied on top of the flags.
    pub fn into_config(self) -> EncoderConfig {
        EncoderConfig {
            model: self.model,
            work_dir: self.work_dir,
            device: if self.cuda {
                DeviceKind::Cuda(0)
            } else {
                DeviceKind::Cpu
            },
            ..Default::default()
        }
        .with_env_overrides()
    }
}
