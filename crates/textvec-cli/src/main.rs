//! textvec command line driver.
//!
//! Thin operational surface over the encoder crates: list the model
//! registry, warm a work directory, encode text to JSON.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "textvec",
    version,
    about = "Text-to-vector encoding with pretrained transformers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported model registry
    Models,
    /// Download model artifacts and persist them into the work directory
    Fetch(commands::fetch::FetchArgs),
    /// Encode texts and print the vectors as JSON
    Encode(commands::encode::EncodeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Models => commands::models::run(),
        Commands::Fetch(args) => commands::fetch::run(args).await,
        Commands::Encode(args) => commands::encode::run(args).await,
    }
}
