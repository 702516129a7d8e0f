//! Category lookup and creation

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Category, NewCategory, TransactionKind};

impl Database {
    /// List all categories, name-ordered
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, type, color, created_at FROM categories ORDER BY name, type",
        )?;

        let categories = stmt
            .query_map([], |row| Self::row_to_category(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Insert categories, skipping any that already exist.
    ///
    /// Existence is decided by the unique index on normalized name and type,
    /// so "Groceries" and " groceries " are the same category. Returns the
    /// full category list afterwards plus the number of rows this call
    /// actually created.
    pub fn create_categories(&self, new: &[NewCategory]) -> Result<(Vec<Category>, usize)> {
        if new.is_empty() {
            return Ok((self.list_categories()?, 0));
        }

        let mut created = 0;
        {
            let mut conn = self.conn()?;
            let tx = conn.transaction()?;
            {
                let mut stmt =
                    tx.prepare("INSERT OR IGNORE INTO categories (name, type) VALUES (?, ?)")?;
                for category in new {
                    created += stmt.execute(params![category.name, category.kind.as_str()])?;
                }
            }
            tx.commit()?;
        }

        Ok((self.list_categories()?, created))
    }

    /// Count total categories
    pub fn count_categories(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    }

    pub(crate) fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        let kind_str: String = row.get(2)?;
        let created_at_str: String = row.get(4)?;
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            // The CHECK constraint keeps this to income/expense
            kind: kind_str.parse().unwrap_or(TransactionKind::Expense),
            color: row.get(3)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
