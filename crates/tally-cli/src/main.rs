//! Tally CLI - Bank CSV importer
//!
//! Usage:
//!   tally init                  Initialize database
//!   tally parse --file CSV      Preview a CSV parse without importing
//!   tally import --file CSV     Import transactions from a CSV export
//!   tally serve --port 3000     Start the import API server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Parse {
            file,
            delimiter,
            decimal_separator,
            source,
            aliases,
            json,
        } => {
            let options =
                commands::build_parse_options(&delimiter, &decimal_separator, source, &aliases)?;
            commands::cmd_parse(&file, options, json)
        }
        Commands::Import {
            file,
            delimiter,
            decimal_separator,
            source,
            aliases,
            include_duplicates,
            server,
            api_key,
        } => {
            let options =
                commands::build_parse_options(&delimiter, &decimal_separator, source, &aliases)?;
            commands::cmd_import(
                &cli.db,
                &file,
                options,
                include_duplicates,
                server.as_deref(),
                api_key,
            )
            .await
        }
        Commands::Transactions { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions_list(&db, limit)
        }
        Commands::Categories => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_categories_list(&db)
        }
        Commands::Status => commands::cmd_status(&cli.db),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth).await,
    }
}
