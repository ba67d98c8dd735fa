use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod bench;
mod commands;
mod repl;

#[derive(Parser)]
#[command(name = "banter")]
#[command(about = "Banter - persona-driven chat client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive chat REPL (default)
    Chat {
        /// TOML persona file overriding the default registry
        #[arg(long)]
        personas: Option<PathBuf>,
    },
    /// Run every persona against a fixed question set and compare
    Bench {
        /// TOML persona file overriding the default registry
        #[arg(long)]
        personas: Option<PathBuf>,
        /// Output path for the JSON results
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also render a Markdown comparison report
        #[arg(long)]
        report: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Chat { personas: None }) {
        Commands::Chat { personas } => repl::run(personas).await,
        Commands::Bench {
            personas,
            output,
            report,
        } => bench::run(personas, output, report).await,
    }
}
