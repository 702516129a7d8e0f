//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Import bank CSV exports into a transaction ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted CSV transaction importer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Parse a CSV file and show what an import would do
    Parse {
        /// CSV file to parse
        #[arg(short, long)]
        file: PathBuf,

        /// Field delimiter
        #[arg(long, default_value = ",")]
        delimiter: String,

        /// Decimal separator used in amounts: "." or ","
        #[arg(long, default_value = ".")]
        decimal_separator: String,

        /// Source label recorded in the parse metadata (defaults to the
        /// file name)
        #[arg(long)]
        source: Option<String>,

        /// Extra header alias, as header=field (repeatable).
        /// Fields: date, description, amount, type, category, notes,
        /// externalId
        #[arg(long = "alias")]
        aliases: Vec<String>,

        /// Print the full parse result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Parse a CSV file and import its transactions
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Field delimiter
        #[arg(long, default_value = ",")]
        delimiter: String,

        /// Decimal separator used in amounts: "." or ","
        #[arg(long, default_value = ".")]
        decimal_separator: String,

        /// Source label stored with each transaction (defaults to the
        /// file name)
        #[arg(long)]
        source: Option<String>,

        /// Extra header alias, as header=field (repeatable)
        #[arg(long = "alias")]
        aliases: Vec<String>,

        /// Import rows flagged as duplicates instead of skipping them
        #[arg(long)]
        include_duplicates: bool,

        /// Send the batch to a remote tally server instead of the local
        /// database, e.g. http://localhost:3000
        #[arg(long)]
        server: Option<String>,

        /// API key for the remote server (falls back to TALLY_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// List recent transactions
    Transactions {
        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// List categories
    Categories,

    /// Show database status
    Status,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a
        /// network. By default every /api request must carry an
        /// Authorization header.
        #[arg(long)]
        no_auth: bool,
    },
}
