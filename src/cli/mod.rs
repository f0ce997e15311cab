//! Command-line interface.
//!
//! Parses arguments and dispatches to the command modules.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::analysis::resolve_country;
use crate::config::Settings;
use crate::store::StorageMode;

#[derive(Parser)]
#[command(name = "influract")]
#[command(about = "Contract analyzer for content creators")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address: a port, a host, or host:port
        #[arg(short, long, env = "INFLURACT_BIND")]
        bind: Option<String>,
        /// Storage backend for analyses
        #[arg(long, value_enum)]
        storage: Option<StorageMode>,
    },

    /// Analyze a contract file and print the result as JSON
    Analyze {
        /// Contract file (.pdf, .docx or .txt)
        file: PathBuf,
        /// Jurisdiction the contract is read under [default: United States]
        #[arg(short, long)]
        country: Option<String>,
        /// Also store the result in the data directory
        #[arg(long)]
        save: bool,
    },

    /// Print the text extracted from a file
    Extract {
        /// Input file
        file: PathBuf,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Serve { bind, storage } => {
            commands::cmd_serve(settings, bind.as_deref(), storage).await
        }
        Commands::Analyze {
            file,
            country,
            save,
        } => commands::cmd_analyze(&settings, &file, &resolve_country(country), save).await,
        Commands::Extract { file } => commands::cmd_extract(&file).await,
    }
}
