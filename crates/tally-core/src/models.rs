//! Domain models for Tally

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Transaction direction. Sign never lives in an amount; it lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    // Exact match only; the wire format is lowercase
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One parsed CSV row that survived validation
///
/// Row numbers are 1-based positions in the file: the header is row 1, so
/// the first data row is row 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvTransactionRecord {
    pub row_number: usize,
    /// ISO calendar date (YYYY-MM-DD), no time component
    pub occurred_on: String,
    pub description: String,
    /// Always >= 0, rounded to 2 decimal places
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub notes: Option<String>,
    /// Original header name -> trimmed original value, kept for diagnostics
    pub raw: BTreeMap<String, String>,
    /// Earliest row sharing this row's duplicate key, set on repeats only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of_row: Option<usize>,
}

/// A repeated entry within one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvDuplicate {
    /// `occurredOn|lowercased description|amount to 2 decimals`
    pub key: String,
    pub first_row: usize,
    pub duplicate_row: usize,
}

/// A data row rejected during normalization; excluded from `transactions`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvRowError {
    pub row_number: usize,
    pub message: String,
    pub raw: BTreeMap<String, String>,
}

/// Parse bookkeeping. `total_rows = processed_rows + skipped_rows` always
/// holds; duplicates count toward processed rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvParseMetadata {
    pub total_rows: usize,
    pub processed_rows: usize,
    pub skipped_rows: usize,
    pub duplicate_count: usize,
    /// Raw header row as it appeared in the file
    pub headers: Vec<String>,
    /// Provenance label (file name or caller-supplied), never validated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Complete output of the CSV parser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvParseResult {
    pub transactions: Vec<CsvTransactionRecord>,
    pub duplicates: Vec<CsvDuplicate>,
    pub errors: Vec<CsvRowError>,
    pub metadata: CsvParseMetadata,
}

/// One transaction as submitted to the import service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingTransaction {
    pub occurred_on: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
}

/// A transaction category
///
/// Categories are unique per `(lowercased trimmed name, type)`: "Food" as an
/// expense and "Food" as income are distinct rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A category staged for insertion
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub kind: TransactionKind,
}

/// A persisted transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub occurred_on: NaiveDate,
    pub description: String,
    /// Always >= 0; direction is carried by `kind`
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category_id: Option<i64>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A transaction row staged for insertion (after intake validation)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub occurred_on: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category_id: Option<i64>,
    pub notes: Option<String>,
    pub source: Option<String>,
}

/// Terminal report of one import call. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub inserted_count: usize,
    pub failed_count: usize,
    pub created_categories: usize,
    /// Every normalized category key in the reconciliation index -> id
    pub category_mappings: BTreeMap<String, i64>,
    /// Reserved for per-row insert diagnostics; empty in the base design
    pub errors: Vec<String>,
}
