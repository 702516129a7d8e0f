//! Transaction command implementations

use anyhow::Result;
use tally_core::{Database, TransactionKind};

use super::truncate;

pub fn cmd_transactions_list(db: &Database, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(limit)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  tally import --file statement.csv");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.kind {
            TransactionKind::Expense => format!("\x1b[31m-{:.2}\x1b[0m", tx.amount), // Red
            TransactionKind::Income => format!("\x1b[32m+{:.2}\x1b[0m", tx.amount), // Green
        };

        println!(
            "   {} │ {:>10} │ {}",
            tx.occurred_on,
            amount_str,
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}
