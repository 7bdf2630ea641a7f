//! `textvec encode`: encode texts and print JSON vectors.
//!
//! # Examples
//!
//! ```bash
//! # Encode arguments
//! textvec encode --model all-minilm-l6-v2 "first text" "second text"
//!
//! # Encode stdin, one input per line
//! cat corpus.txt | textvec encode --stdin
//! ```

use std::io::BufRead;

use anyhow::Context;
use clap::Args;

use textvec_core::{BatchConfig, Batched, TextEncoder};
use textvec_transformers::TransformerEncoder;

use super::EncoderArgs;

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub encoder: EncoderArgs,

    /// Texts to encode; ignored when --stdin is set
    pub texts: Vec<String>,

    /// Read inputs from stdin, one per line
    #[arg(long)]
    pub stdin: bool,

    /// Largest batch forwarded to the model in one call
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,
}

pub async fn run(args: EncodeArgs) -> anyhow::Result<()> {
    let texts = if args.stdin {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read stdin")?
    } else {
        args.texts.clone()
    };
    anyhow::ensure!(!texts.is_empty(), "no input texts given");

    let encoder = Batched::new(
        TransformerEncoder::new(args.encoder.into_config())?,
        BatchConfig {
            max_batch_size: args.batch_size,
        },
    )?;
    encoder.initialize().await?;

    let rows = encoder.encode(&texts).await?;
    serde_json::to_writer(std::io::stdout().lock(), &rows)?;
    println!();
    Ok(())
}
