//! Credit Inference - Main Entry Point

use clap::Parser;
use credit_inference::cli::{cmd_batch, cmd_check, cmd_describe, cmd_predict, resolve_config, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_inference=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Predict { record, json } => cmd_predict(config, &record, json)?,
        Commands::Batch { records, json } => cmd_batch(config, &records, json)?,
        Commands::Describe => cmd_describe(config)?,
        Commands::Check => cmd_check(config)?,
    }

    Ok(())
}
