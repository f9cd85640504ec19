//! Coastwatch - main entry point

use clap::Parser;
use coastwatch::cli::{cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coastwatch=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            hazard,
            data,
            output,
            tune,
            seed,
        } => {
            cmd_train(&hazard, &data, &output, tune, seed)?;
        }
        Commands::Serve {
            artifact,
            host,
            port,
        } => {
            cmd_serve(artifact, host, port).await?;
        }
    }

    Ok(())
}
