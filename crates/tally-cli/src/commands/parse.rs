//! CSV parse preview command and shared parser option handling

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{parse_transactions_file, CsvField, CsvParseResult, DecimalSeparator, ParseOptions};

use super::truncate;

/// Build `ParseOptions` from raw CLI arguments.
///
/// Shared by `parse` and `import`, which take the same parser flags.
pub fn build_parse_options(
    delimiter: &str,
    decimal_separator: &str,
    source: Option<String>,
    aliases: &[String],
) -> Result<ParseOptions> {
    let mut chars = delimiter.chars();
    let delimiter = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => anyhow::bail!("Delimiter must be a single character, got {:?}", delimiter),
    };

    let decimal_separator: DecimalSeparator = decimal_separator
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let mut extra_aliases = Vec::with_capacity(aliases.len());
    for pair in aliases {
        let (header, field) = pair
            .split_once('=')
            .with_context(|| format!("Invalid alias {:?} (use header=field)", pair))?;
        let field: CsvField = field.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        extra_aliases.push((header.trim().to_string(), field));
    }

    Ok(ParseOptions {
        delimiter,
        decimal_separator,
        source_name: source,
        extra_aliases,
    })
}

pub fn cmd_parse(file: &Path, options: ParseOptions, json: bool) -> Result<()> {
    let result = parse_transactions_file(file, &options)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_parse_summary(&result);
    Ok(())
}

/// Print the human-readable half of a parse result: totals, then row errors
/// and duplicates if there are any.
pub fn print_parse_summary(result: &CsvParseResult) {
    println!();
    println!("📊 Parse Results");
    println!("   ─────────────────────────────");
    println!("   Total rows: {}", result.metadata.total_rows);
    println!("   Parsed: {}", result.metadata.processed_rows);
    println!("   Skipped: {}", result.metadata.skipped_rows);
    println!("   Duplicates flagged: {}", result.metadata.duplicate_count);

    if !result.errors.is_empty() {
        println!();
        println!("⚠️  {} rows could not be parsed:", result.errors.len());
        for error in &result.errors {
            println!("   Row {}: {}", error.row_number, error.message);
        }
    }

    if !result.duplicates.is_empty() {
        println!();
        println!("👯 Duplicates:");
        for dup in &result.duplicates {
            println!(
                "   Row {} repeats row {} ({})",
                dup.duplicate_row,
                dup.first_row,
                truncate(&dup.key, 50)
            );
        }
    }
}
