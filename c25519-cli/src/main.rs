//! c25519 - build the multi-variant c25519 bridge.

mod commands;

use anyhow::Result;
use c25519_build::observability::{LogSettings, init_logging};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// c25519 - X25519/Ed25519 bridge builder.
#[derive(Parser)]
#[command(name = "c25519")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every profile and loading convention
    Build {
        /// Project root; relative configuration paths resolve against it
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Configuration file (default: <root>/c25519-build.yaml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Build only these profiles (repeatable)
        #[arg(short, long = "profile")]
        profiles: Vec<String>,
    },

    /// Harvest placeholder tokens and print both views, without compiling
    Tokens {
        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogSettings::for_verbosity(cli.verbose))?;

    match cli.command {
        Commands::Build {
            root,
            config,
            profiles,
        } => commands::build::run(&root, config.as_deref(), &profiles).await,
        Commands::Tokens { root, config } => commands::tokens::run(&root, config.as_deref()).await,
        Commands::Version => commands::version::run(),
    }
}
