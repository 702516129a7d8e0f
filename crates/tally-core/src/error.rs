//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File-level defect that aborts parsing before any row is processed,
    /// e.g. a missing required CSV column.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Batch intake rejection. The whole import is refused and nothing is
    /// persisted; the message aggregates every row-level finding.
    #[error("{0}")]
    Validation(String),

    /// Store-phase failure during category reconciliation or transaction
    /// insertion. The message is caller-facing.
    #[error("{0}")]
    Import(String),
}

pub type Result<T> = std::result::Result<T, Error>;
