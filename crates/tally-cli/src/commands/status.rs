//! Status and category listing commands

use std::path::Path;

use anyhow::Result;
use tally_core::{Database, TransactionKind};

use super::open_db;

pub fn cmd_status(db_path: &Path) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Tally Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if !db_path.exists() {
        println!("   Size: (database not initialized)");
        println!();
        println!("   Run 'tally init' to create it.");
        println!();
        return Ok(());
    }

    if let Ok(metadata) = fs::metadata(db_path) {
        let size_kb = metadata.len() as f64 / 1024.0;
        if size_kb < 1024.0 {
            println!("   Size: {:.1} KB", size_kb);
        } else {
            println!("   Size: {:.1} MB", size_kb / 1024.0);
        }
    }

    match open_db(db_path) {
        Ok(db) => {
            let transactions = db.count_transactions()?;
            let categories = db.count_categories()?;
            println!();
            println!("   Transactions: {}", transactions);
            println!("   Categories: {}", categories);
        }
        Err(e) => {
            println!();
            println!("   ❌ Error opening database: {}", e);
        }
    }

    println!();
    Ok(())
}

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let categories = db.list_categories()?;

    if categories.is_empty() {
        println!("No categories yet. They are created during import:");
        println!("  tally import --file statement.csv");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────");

    for category in categories {
        let kind_label = match category.kind {
            TransactionKind::Income => "income ",
            TransactionKind::Expense => "expense",
        };
        println!("   [{:>3}] {} │ {}", category.id, kind_label, category.name);
    }

    Ok(())
}
