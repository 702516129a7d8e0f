//! Import command implementation
//!
//! Parses a CSV export, then hands the batch either to the local database or
//! to a remote tally server's /api/import endpoint. Both paths go through the
//! same JSON payload shape, so a batch that imports locally imports remotely
//! too.

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{CsvParseResult, ImportSummary, ParseOptions};

use super::open_db;

pub async fn cmd_import(
    db_path: &Path,
    file: &Path,
    options: ParseOptions,
    include_duplicates: bool,
    server: Option<&str>,
    api_key: Option<String>,
) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let result = tally_core::parse_transactions_file(file, &options)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    println!(
        "   Parsed: {} of {} rows",
        result.metadata.processed_rows, result.metadata.total_rows
    );

    if !result.errors.is_empty() {
        println!("   ⚠️  {} rows skipped:", result.errors.len());
        for error in &result.errors {
            println!("      Row {}: {}", error.row_number, error.message);
        }
    }

    if result.transactions.is_empty() {
        anyhow::bail!("No importable transactions in {}", file.display());
    }

    let payload = batch_payload(&result, include_duplicates);
    let batch_len = payload["transactions"].as_array().map_or(0, Vec::len);

    if !include_duplicates && result.metadata.duplicate_count > 0 {
        println!(
            "   Duplicates excluded: {} (use --include-duplicates to keep them)",
            result.metadata.duplicate_count
        );
    }

    if batch_len == 0 {
        println!();
        println!("Nothing to import: every parsed row repeats an earlier one.");
        return Ok(());
    }

    let summary = match server {
        Some(server) => import_remote(server, api_key, &payload).await?,
        None => {
            let db = open_db(db_path)?;
            tally_core::import_transactions(&db, &payload)?
        }
    };

    println!();
    println!("✅ Import complete!");
    println!("   Inserted: {}", summary.inserted_count);
    if summary.failed_count > 0 {
        println!("   Failed: {}", summary.failed_count);
    }
    println!("   Categories created: {}", summary.created_categories);

    Ok(())
}

/// Build the /api/import request body from a parse result.
///
/// Rows flagged as duplicates are dropped unless asked for; the metadata
/// source label is stamped onto every item.
fn batch_payload(result: &CsvParseResult, include_duplicates: bool) -> serde_json::Value {
    let items: Vec<serde_json::Value> = result
        .transactions
        .iter()
        .filter(|tx| include_duplicates || tx.duplicate_of_row.is_none())
        .map(|tx| {
            serde_json::json!({
                "occurredOn": tx.occurred_on,
                "description": tx.description,
                "amount": tx.amount,
                "type": tx.kind,
                "category": tx.category,
                "notes": tx.notes,
                "source": result.metadata.source,
            })
        })
        .collect();

    serde_json::json!({ "transactions": items })
}

async fn import_remote(
    server: &str,
    api_key: Option<String>,
    payload: &serde_json::Value,
) -> Result<ImportSummary> {
    let url = format!("{}/api/import", server.trim_end_matches('/'));
    println!("   Sending to {}...", url);

    let client = reqwest::Client::new();
    let mut request = client.post(&url).json(payload);

    let api_key = api_key.or_else(|| std::env::var("TALLY_API_KEY").ok());
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .context("Failed to read server response")?;

    if !status.is_success() {
        // Error bodies are {"error": "..."}; fall back to the raw text for
        // anything else (proxies, HTML error pages)
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v["error"].as_str().map(String::from))
            .unwrap_or(text);
        anyhow::bail!("Server rejected the import ({}): {}", status, message);
    }

    serde_json::from_str(&text).context("Server returned an unexpected response body")
}
