//! Slowverb CLI
//!
//! Command-line interface for the Slowverb audio processor.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use slowverb::cli::{commands, Cli, Commands};
use slowverb::Result;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(cmd) => {
            if let Err(e) = handle_command(cmd).await {
                for suggestion in e.recovery_suggestions() {
                    eprintln!("  - {}", suggestion);
                }
                return Err(e.into());
            }
            Ok(())
        }
        None => {
            println!("Slowverb v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

async fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Process {
            input,
            effects,
            output_dir,
            ffmpeg,
            timeout_ms,
        } => {
            commands::process(
                &input,
                &effects,
                output_dir.as_deref(),
                ffmpeg.as_deref(),
                timeout_ms,
            )
            .await
        }
        Commands::Graph { effects, json } => commands::show_graph(&effects, json),
        Commands::Presets { json } => commands::list_presets(json),
    }
}
