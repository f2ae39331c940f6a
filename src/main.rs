//! # Sheet Directory CLI (`sheetdir`)
//!
//! ## Usage
//!
//! ```bash
//! sheetdir --config ./config/sheetdir.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sheetdir list` | Load the sheet and print the filtered cards |
//! | `sheetdir tags` | Print the active tag axis and its vocabulary |
//! | `sheetdir columns` | Print which header resolved to each logical field |
//! | `sheetdir serve relay` | Start the pass-through fetch relay |
//!
//! ## Examples
//!
//! ```bash
//! # Everything tagged Art that mentions NFTs
//! sheetdir list --tag Art --query nft
//!
//! # Machine-readable output for a front end
//! sheetdir list --json
//!
//! # Relay for browser clients
//! sheetdir serve relay
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use sheet_directory::{commands, config, logging, server};

/// Sheet Directory: a searchable, filterable directory built from a
/// published spreadsheet.
#[derive(Parser)]
#[command(
    name = "sheetdir",
    about = "Sheet Directory: a searchable, filterable directory built from a published spreadsheet",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/sheetdir.toml")]
    config: PathBuf,

    /// Verbose logging on stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the directory and print the cards that pass the filters.
    ///
    /// Tags are compared case- and punctuation-insensitively; several
    /// `--tag` flags select rows carrying any of them. `--query` is a
    /// case-insensitive substring search over titles, descriptions and tags.
    List {
        /// Select a tag (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Free-text search.
        #[arg(long)]
        query: Option<String>,

        /// Emit the directory view as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the tag vocabulary for the current data.
    Tags {
        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print which sheet header was matched to each logical field.
    Columns,

    /// Start a server.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

#[derive(Subcommand)]
enum ServeService {
    /// Start the pass-through fetch relay on `[relay].bind`.
    Relay,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let ok = match cli.command {
        Commands::List { tags, query, json } => {
            let cfg = config::load_config(&cli.config)?;
            commands::run_list(&cfg, &tags, query.as_deref(), json).await?
        }
        Commands::Tags { json } => {
            let cfg = config::load_config(&cli.config)?;
            commands::run_tags(&cfg, json).await?
        }
        Commands::Columns => {
            let cfg = config::load_config(&cli.config)?;
            commands::run_columns(&cfg).await?
        }
        Commands::Serve { service } => match service {
            ServeService::Relay => {
                // The relay needs no data source, so it also runs without a config file.
                let cfg = if cli.config.exists() {
                    config::load_config(&cli.config)?
                } else {
                    config::Config::default()
                };
                server::run_relay(&cfg).await?;
                true
            }
        },
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
