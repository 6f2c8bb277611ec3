//! Command-line interface for chatsim
//!
//! Every command is deterministic for a given configuration and anchor
//! date; pass `--anchor-date` to pin the timestamps across days.

use chatsim::commands;
use chatsim::{Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { common, output } => {
            commands::run_generate(common, output.as_deref()).await?;
        }
        Commands::Export {
            common,
            start,
            end,
            output,
        } => {
            commands::run_export(common, start, end, output.as_deref()).await?;
        }
        Commands::Page {
            common,
            view,
            start,
            pages,
        } => {
            commands::run_page(common, view, start, pages).await?;
        }
        Commands::Stream { common, stream } => {
            commands::run_stream(common, stream).await?;
        }
        Commands::Estimate {
            msgs_per_min,
            days,
            avg_per_person_per_day,
        } => {
            commands::run_estimate(msgs_per_min, days, avg_per_person_per_day)?;
        }
        Commands::People { people, limit } => {
            commands::run_people(people, limit)?;
        }
    }

    Ok(())
}
