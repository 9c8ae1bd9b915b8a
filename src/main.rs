//! Coursecast - Main Entry Point

use clap::Parser;
use coursecast::cli::{cmd_predict, cmd_schema, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coursecast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            out,
            label,
            seed,
            test_size,
        } => {
            cmd_train(&data, &out, &label, seed, test_size)?;
        }
        Commands::Predict { bundle, input } => {
            cmd_predict(&bundle, &input)?;
        }
        Commands::Schema { bundle } => {
            cmd_schema(&bundle)?;
        }
    }

    Ok(())
}
