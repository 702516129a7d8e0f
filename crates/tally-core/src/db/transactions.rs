//! Transaction persistence and listing

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction, TransactionKind};

impl Database {
    /// Insert a batch of transactions atomically.
    ///
    /// All rows go through a single SQL transaction; if any row fails,
    /// nothing is inserted. Returns the number of rows inserted.
    pub fn insert_transactions(&self, new: &[NewTransaction]) -> Result<usize> {
        if new.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO transactions (occurred_on, description, amount, type, category_id, notes, source)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for record in new {
                inserted += stmt.execute(params![
                    record.occurred_on.to_string(),
                    record.description,
                    record.amount,
                    record.kind.as_str(),
                    record.category_id,
                    record.notes,
                    record.source,
                ])?;
            }
        }
        tx.commit()?;

        Ok(inserted)
    }

    /// List transactions, newest first
    pub fn list_transactions(&self, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, occurred_on, description, amount, type, category_id, notes, source, created_at
            FROM transactions
            ORDER BY occurred_on DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let transactions = stmt
            .query_map(params![limit], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Count total transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let occurred_on_str: String = row.get(1)?;
        let kind_str: String = row.get(4)?;
        let created_at_str: String = row.get(8)?;
        Ok(Transaction {
            id: row.get(0)?,
            occurred_on: chrono::NaiveDate::parse_from_str(&occurred_on_str, "%Y-%m-%d")
                .unwrap_or_default(),
            description: row.get(2)?,
            amount: row.get(3)?,
            kind: kind_str.parse().unwrap_or(TransactionKind::Expense),
            category_id: row.get(5)?,
            notes: row.get(6)?,
            source: row.get(7)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
