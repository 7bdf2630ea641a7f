//! `textvec fetch`: warm the work directory.
//!
//! Initializes an encoder (downloading from the hub when the work
//! directory is cold) and persists the artifacts back into it, so later
//! runs initialize without network access.

use clap::Args;
use tracing::info;

use textvec_core::TextEncoder;
use textvec_transformers::TransformerEncoder;

use super::EncoderArgs;

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub encoder: EncoderArgs,
}

pub async fn run(args: FetchArgs) -> anyhow::Result<()> {
    let config = args.encoder.into_config();
    let work_dir = config.work_dir.clone();

    let encoder = TransformerEncoder::new(config)?;
    encoder.initialize().await?;
    encoder.persist().await?;

    info!(work_dir = %work_dir.display(), "model artifacts ready");
    println!(
        "{}: artifacts persisted to {}",
        encoder.model_name(),
        work_dir.display()
    );
    Ok(())
}
