//! Tally Core Library
//!
//! Shared functionality for the Tally transaction ingestion tool:
//! - CSV parsing and normalization for bank exports
//! - Import reconciliation (category creation + batch insert)
//! - Database access and migrations

pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod parse;

pub use db::Database;
pub use error::{Error, Result};
pub use import::import_transactions;
pub use models::{
    Category, CsvDuplicate, CsvParseMetadata, CsvParseResult, CsvRowError, CsvTransactionRecord,
    ImportSummary, IncomingTransaction, NewCategory, NewTransaction, Transaction, TransactionKind,
};
pub use parse::{
    parse_transactions, parse_transactions_file, CsvField, DecimalSeparator, ParseOptions,
};
