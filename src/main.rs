// src/main.rs
// ollama-relay - streaming chat and document analysis in front of Ollama

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ollama_relay::{RelayConfig, api::http::serve};

#[derive(Parser)]
#[command(name = "ollama-relay")]
#[command(about = "Streaming chat and document analysis relay for a local Ollama server")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: RelayConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads the environment
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ollama_relay=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    cli.config.validate()?;

    info!("Starting ollama-relay");
    info!("Ollama: {}", cli.config.upstream.base_url());
    info!("Model: {}", cli.config.upstream.model);

    serve(cli.config).await
}
