//! CSV transaction parsing and normalization
//!
//! Turns raw bank-export CSV text into a batch of validated transaction
//! candidates. Tolerant by contract: once the header row validates, bad rows
//! land in `errors` and parsing continues. Duplicates are flagged, never
//! dropped; excluding them is the caller's decision.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    CsvDuplicate, CsvParseMetadata, CsvParseResult, CsvRowError, CsvTransactionRecord,
    TransactionKind,
};

/// Canonical CSV column meanings after header aliasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsvField {
    Date,
    Description,
    Amount,
    Kind,
    Category,
    Notes,
    ExternalId,
}

impl CsvField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Kind => "type",
            Self::Category => "category",
            Self::Notes => "notes",
            Self::ExternalId => "externalId",
        }
    }
}

impl std::str::FromStr for CsvField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "description" => Ok(Self::Description),
            "amount" => Ok(Self::Amount),
            "type" => Ok(Self::Kind),
            "category" => Ok(Self::Category),
            "notes" => Ok(Self::Notes),
            "externalid" | "external_id" => Ok(Self::ExternalId),
            _ => Err(format!("Unknown CSV field: {}", s)),
        }
    }
}

/// Decimal separator used in amount fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecimalSeparator {
    #[default]
    Dot,
    Comma,
}

impl DecimalSeparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dot => ".",
            Self::Comma => ",",
        }
    }
}

impl std::str::FromStr for DecimalSeparator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "." | "dot" => Ok(Self::Dot),
            "," | "comma" => Ok(Self::Comma),
            _ => Err(format!("Unknown decimal separator: {}", s)),
        }
    }
}

impl std::fmt::Display for DecimalSeparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parser configuration
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Field delimiter, comma unless the export says otherwise
    pub delimiter: char,
    pub decimal_separator: DecimalSeparator,
    /// Provenance label copied into metadata, never validated
    pub source_name: Option<String>,
    /// Additional `(header, field)` pairs consulted when the built-in alias
    /// table has no match. Keys get the same normalization as incoming
    /// headers.
    pub extra_aliases: Vec<(String, CsvField)>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: DecimalSeparator::Dot,
            source_name: None,
            extra_aliases: Vec::new(),
        }
    }
}

/// Built-in header alias table, keyed by sanitized header text.
///
/// Covers the common spellings across bank exports. Unrecognized headers are
/// ignored rather than rejected; `ParseOptions::extra_aliases` extends the
/// table without touching it.
const BUILTIN_ALIASES: &[(&str, CsvField)] = &[
    ("date", CsvField::Date),
    ("transaction_date", CsvField::Date),
    ("posted_date", CsvField::Date),
    ("booking_date", CsvField::Date),
    ("occurred_on", CsvField::Date),
    ("description", CsvField::Description),
    ("details", CsvField::Description),
    ("memo", CsvField::Description),
    ("amount", CsvField::Amount),
    ("value", CsvField::Amount),
    ("eur", CsvField::Amount),
    ("debit", CsvField::Amount),
    ("credit", CsvField::Amount),
    ("type", CsvField::Kind),
    ("transaction_type", CsvField::Kind),
    ("category", CsvField::Category),
    ("category_name", CsvField::Category),
    ("tag", CsvField::Category),
    ("notes", CsvField::Notes),
    ("note", CsvField::Notes),
    ("memo_note", CsvField::Notes),
    ("reference", CsvField::ExternalId),
    ("external_id", CsvField::ExternalId),
    ("id", CsvField::ExternalId),
];

/// Columns that must resolve for parsing to proceed at all
const REQUIRED_FIELDS: &[CsvField] = &[CsvField::Date, CsvField::Description, CsvField::Amount];

/// Split raw CSV text into rows of fields.
///
/// Hand-rolled RFC4180-style scanner: quoted fields escape quotes by
/// doubling, delimiters and newlines inside quotes are literal, and `\n`,
/// `\r\n`, and lone `\r` all end a row. Rows with no completed fields and no
/// pending characters are dropped, which swallows trailing blank lines.
fn tokenize(content: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut inside_quotes = false;

    let end_row = |row: &mut Vec<String>, field: &mut String, rows: &mut Vec<Vec<String>>| {
        if !row.is_empty() || !field.is_empty() {
            row.push(std::mem::take(field));
        }
        if !row.is_empty() {
            rows.push(std::mem::take(row));
        }
    };

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if inside_quotes && chars.peek() == Some(&'"') {
                field.push('"');
                chars.next();
            } else {
                inside_quotes = !inside_quotes;
            }
            continue;
        }

        if !inside_quotes && c == delimiter {
            row.push(std::mem::take(&mut field));
            continue;
        }

        if !inside_quotes && (c == '\n' || c == '\r') {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            end_row(&mut row, &mut field, &mut rows);
            continue;
        }

        field.push(c);
    }

    end_row(&mut row, &mut field, &mut rows);
    rows
}

/// Normalize a header for alias lookup: trim, lowercase, every run of
/// non-alphanumeric characters collapsed to a single underscore.
fn sanitize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut in_run = false;

    for c in header.trim().chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }

    out
}

fn resolve_header(sanitized: &str, extra_aliases: &[(String, CsvField)]) -> Option<CsvField> {
    BUILTIN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == sanitized)
        .map(|(_, field)| *field)
        .or_else(|| {
            extra_aliases
                .iter()
                .find(|(alias, _)| alias == sanitized)
                .map(|(_, field)| *field)
        })
}

fn build_header_map(
    headers: &[String],
    extra_aliases: &[(String, CsvField)],
) -> Vec<Option<CsvField>> {
    // Alias keys get the same normalization as headers, so callers can
    // supply raw spellings like "Posting Day".
    let extra: Vec<(String, CsvField)> = extra_aliases
        .iter()
        .map(|(alias, field)| (sanitize_header(alias), *field))
        .collect();

    headers
        .iter()
        .map(|header| resolve_header(&sanitize_header(header), &extra))
        .collect()
}

fn ensure_required_headers(header_map: &[Option<CsvField>], headers: &[String]) -> Result<()> {
    let present: HashSet<CsvField> = header_map.iter().flatten().copied().collect();
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !present.contains(field))
        .map(|field| field.as_str())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let quoted = missing
        .iter()
        .map(|name| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::InvalidData(format!(
        "CSV is missing required columns: {} (detected headers: {})",
        quoted,
        headers.join(", ")
    )))
}

/// Parse a raw date cell into an ISO `YYYY-MM-DD` string.
///
/// Dots are treated as slashes, then the value must split into exactly three
/// numeric parts. A 4-character first part means `YYYY/MM/DD`; a 4-character
/// last part means day and month come first, disambiguated by whichever part
/// exceeds 12. When both are 12 or less the tie-break is DD/MM. The result
/// must be a real calendar date.
fn parse_date_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.replace('.', "/");
    let parts: Vec<&str> = normalized
        .split(['/', '-'])
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }

    let (year, month, day): (i32, u32, u32) = if parts[0].len() == 4 {
        (
            parts[0].parse().ok()?,
            parts[1].parse().ok()?,
            parts[2].parse().ok()?,
        )
    } else if parts[2].len() == 4 {
        let year = parts[2].parse().ok()?;
        let first: u32 = parts[0].parse().ok()?;
        let second: u32 = parts[1].parse().ok()?;

        if first > 12 && second <= 12 {
            (year, second, first)
        } else if second > 12 && first <= 12 {
            (year, first, second)
        } else {
            // Ambiguous day/month pair defaults to DD/MM/YYYY ordering
            (year, second, first)
        }
    } else {
        return None;
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Parse a raw amount cell, tolerating currency symbols and thousands
/// separators. Sign is preserved; the caller decides what it means.
fn parse_amount_value(raw: &str, decimal_separator: DecimalSeparator) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut normalized: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    match decimal_separator {
        DecimalSeparator::Comma => {
            // Dots are thousands separators; the last comma is the decimal
            // point and any comma before it is a thousands separator too.
            normalized.retain(|c| c != '.');
            if let Some(last_comma) = normalized.rfind(',') {
                let (head, tail) = normalized.split_at(last_comma);
                let head: String = head.chars().filter(|&c| c != ',').collect();
                normalized = format!("{}.{}", head, &tail[1..]);
            }
        }
        DecimalSeparator::Dot => {
            normalized.retain(|c| c != ',');
        }
    }

    normalized.parse::<f64>().ok()
}

/// Map a raw type cell onto a transaction kind via the synonym table.
/// Returns None for anything unrecognized so the caller can fall back to
/// the amount's sign.
fn parse_kind(raw: &str) -> Option<TransactionKind> {
    match raw.trim().to_lowercase().as_str() {
        "income" | "credit" | "inflow" | "deposit" => Some(TransactionKind::Income),
        "expense" | "debit" | "outflow" | "withdrawal" | "payment" => {
            Some(TransactionKind::Expense)
        }
        _ => None,
    }
}

/// Collapse runs of whitespace to single spaces; empty becomes None
fn normalize_whitespace(value: &str) -> Option<String> {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derived identity for intra-file duplicate detection:
/// `occurredOn|lowercased description|amount to 2 decimals`
fn duplicate_key(record: &CsvTransactionRecord) -> String {
    format!(
        "{}|{}|{:.2}",
        record.occurred_on,
        record.description.to_lowercase(),
        record.amount
    )
}

/// Original header -> trimmed cell value, for diagnostics. Cells missing
/// from short rows become empty strings.
fn raw_record(headers: &[String], values: &[String]) -> BTreeMap<String, String> {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let value = values
                .get(index)
                .map(|v| v.trim().to_string())
                .unwrap_or_default();
            (header.clone(), value)
        })
        .collect()
}

/// Parse CSV text into normalized transaction candidates.
///
/// Fails only on structural defects (missing required columns). Row-level
/// problems become `CsvRowError`s; repeated rows are tagged with
/// `duplicate_of_row` and listed in `duplicates` but stay in `transactions`.
pub fn parse_transactions(content: &str, options: &ParseOptions) -> Result<CsvParseResult> {
    let rows = tokenize(content, options.delimiter);

    if rows.is_empty() {
        return Ok(CsvParseResult {
            transactions: vec![],
            duplicates: vec![],
            errors: vec![CsvRowError {
                row_number: 0,
                message: "CSV file does not contain any rows.".to_string(),
                raw: BTreeMap::new(),
            }],
            metadata: CsvParseMetadata {
                total_rows: 0,
                processed_rows: 0,
                skipped_rows: 0,
                duplicate_count: 0,
                headers: vec![],
                source: options.source_name.clone(),
            },
        });
    }

    let header_row = &rows[0];
    let value_rows = &rows[1..];
    let header_map = build_header_map(header_row, &options.extra_aliases);
    ensure_required_headers(&header_map, header_row)?;

    let mut transactions: Vec<CsvTransactionRecord> = Vec::new();
    let mut duplicates: Vec<CsvDuplicate> = Vec::new();
    let mut errors: Vec<CsvRowError> = Vec::new();
    let mut seen_keys: HashMap<String, usize> = HashMap::new();

    for (index, values) in value_rows.iter().enumerate() {
        // Header occupies row 1, so the first data row is row 2
        let row_number = index + 2;
        let raw = raw_record(header_row, values);

        // Last mapped column wins when several headers resolve to the same
        // field (e.g. separate Debit and Credit columns).
        let mut mapped: HashMap<CsvField, Option<&str>> = HashMap::new();
        for (column, field) in header_map.iter().enumerate() {
            if let Some(field) = field {
                mapped.insert(*field, values.get(column).map(String::as_str));
            }
        }
        let cell = |field: CsvField| mapped.get(&field).copied().flatten();

        let occurred_on = match cell(CsvField::Date).and_then(parse_date_value) {
            Some(date) => date,
            None => {
                errors.push(CsvRowError {
                    row_number,
                    message: "Missing or invalid date value.".to_string(),
                    raw,
                });
                continue;
            }
        };

        let description = match cell(CsvField::Description).and_then(normalize_whitespace) {
            Some(description) => description,
            None => {
                errors.push(CsvRowError {
                    row_number,
                    message: "Missing transaction description.".to_string(),
                    raw,
                });
                continue;
            }
        };

        let amount_value = match cell(CsvField::Amount)
            .and_then(|raw| parse_amount_value(raw, options.decimal_separator))
        {
            Some(amount) => amount,
            None => {
                errors.push(CsvRowError {
                    row_number,
                    message: "Missing or invalid amount value.".to_string(),
                    raw,
                });
                continue;
            }
        };

        // Explicit type column wins; otherwise the sign decides
        let kind = cell(CsvField::Kind)
            .and_then(parse_kind)
            .unwrap_or(if amount_value < 0.0 {
                TransactionKind::Expense
            } else {
                TransactionKind::Income
            });

        let category = cell(CsvField::Category).and_then(normalize_whitespace);
        let notes = cell(CsvField::Notes).and_then(normalize_whitespace);

        let mut record = CsvTransactionRecord {
            row_number,
            occurred_on,
            description,
            amount: round_to_cents(amount_value.abs()),
            kind,
            category,
            notes,
            raw,
            duplicate_of_row: None,
        };

        let key = duplicate_key(&record);
        match seen_keys.get(&key) {
            Some(&first_row) => {
                record.duplicate_of_row = Some(first_row);
                duplicates.push(CsvDuplicate {
                    key,
                    first_row,
                    duplicate_row: row_number,
                });
            }
            None => {
                seen_keys.insert(key, row_number);
            }
        }

        transactions.push(record);
    }

    let metadata = CsvParseMetadata {
        total_rows: value_rows.len(),
        processed_rows: transactions.len(),
        skipped_rows: errors.len(),
        duplicate_count: duplicates.len(),
        headers: header_row.clone(),
        source: options.source_name.clone(),
    };

    debug!(
        "Parsed {} rows: {} transactions, {} errors, {} duplicates",
        metadata.total_rows, metadata.processed_rows, metadata.skipped_rows,
        metadata.duplicate_count
    );

    Ok(CsvParseResult {
        transactions,
        duplicates,
        errors,
        metadata,
    })
}

/// Read a CSV file and parse it. The file name becomes the metadata source
/// label unless the options already carry one.
pub fn parse_transactions_file<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
) -> Result<CsvParseResult> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let mut options = options.clone();
    if options.source_name.is_none() {
        options.source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
    }

    parse_transactions(&content, &options)
}
