use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "slicegrid",
    about = "slicegrid — zone-aware endpoint slice balancing",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Partition each scenario's endpoints and print the slice groups
    Balance {
        /// Scenario file ([[scenario]] tables)
        #[arg(short, long)]
        input: PathBuf,
        /// Strategy: LocalShared, Original, SharedGlobal, SharedMultiZone
        #[arg(short, long, default_value = "LocalShared")]
        algorithm: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Score every scenario and write a CSV report.
    ///
    /// Scoring weights and the strategy come from slicegrid.toml when
    /// --config is given; --algorithm overrides the configured strategy.
    Evaluate {
        /// Scenario file ([[scenario]] tables)
        #[arg(short, long)]
        input: PathBuf,
        /// CSV report to write
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        algorithm: Option<String>,
        /// Path to slicegrid.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slicegrid=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Balance {
            input,
            algorithm,
            format,
        } => commands::balance::balance(&input, &algorithm, &format),
        Commands::Evaluate {
            input,
            output,
            algorithm,
            config,
        } => {
            commands::evaluate::evaluate(&input, &output, algorithm.as_deref(), config.as_deref())
                .await
        }
    }
}
