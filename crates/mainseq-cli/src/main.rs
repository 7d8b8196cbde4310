//! mainseq CLI tool.
//!
//! Usage:
//! ```bash
//! mainseq analyse [OPTIONS] [PATH]
//! mainseq init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Coupling metrics for Go packages: stability, abstractness and distance
/// from the main sequence
#[derive(Parser)]
#[command(name = "mainseq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics for every package of a Go module
    #[command(alias = "analyze")]
    Analyse {
        /// Module root (default: `analyzer.root` from config, else current directory)
        path: Option<PathBuf>,

        /// Output format (default: `output.format` from config, else text)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Maximum number of files read or parsed at the same time
        #[arg(short = 'j', long)]
        max_concurrency: Option<usize>,

        /// Exclude patterns relative to the module root (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Decimals shown for each score
        #[arg(long)]
        precision: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Exit with code 2 if any package falls into this zone
        #[arg(long)]
        fail_on_zone: Option<ZoneArg>,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One line per package.
    Compact,
}

/// Zones usable as a failure condition.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ZoneArg {
    /// Concrete and heavily depended upon.
    Pain,
    /// Abstract and unused.
    Uselessness,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyse {
            path,
            format,
            max_concurrency,
            exclude,
            precision,
            no_color,
            fail_on_zone,
        } => {
            let project_dir = path.clone().unwrap_or_else(|| PathBuf::from("."));
            let source = config_resolver::resolve(&project_dir, cli.config.as_deref());
            commands::analyse::run(
                &source,
                commands::analyse::Overrides {
                    path,
                    format,
                    max_concurrency,
                    exclude,
                    precision,
                    no_color,
                    fail_on_zone,
                    verbose: cli.verbose,
                },
            )
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
