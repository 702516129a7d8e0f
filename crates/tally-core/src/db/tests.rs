//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn category(name: &str, kind: TransactionKind) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            kind,
        }
    }

    fn transaction(date: &str, description: &str, amount: f64) -> NewTransaction {
        NewTransaction {
            occurred_on: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: description.to_string(),
            amount,
            kind: TransactionKind::Expense,
            category_id: None,
            notes: None,
            source: Some("csv".to_string()),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_categories().unwrap().is_empty());
        assert_eq!(db.count_transactions().unwrap(), 0);
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('categories') WHERE name IN ('id', 'name', 'type', 'color', 'created_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 5, "categories table should have 5 expected columns");

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('transactions') WHERE name IN ('id', 'occurred_on', 'description', 'amount', 'type', 'category_id', 'notes', 'source', 'created_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(
            result, 9,
            "transactions table should have 9 expected columns"
        );
    }

    #[test]
    fn test_create_and_list_categories() {
        let db = Database::in_memory().unwrap();

        let (categories, created) = db
            .create_categories(&[
                category("Groceries", TransactionKind::Expense),
                category("Salary", TransactionKind::Income),
            ])
            .unwrap();

        assert_eq!(created, 2);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Groceries");
        assert_eq!(categories[0].kind, TransactionKind::Expense);
        assert!(categories[0].id > 0);
        assert_eq!(categories[1].name, "Salary");
        assert_eq!(categories[1].kind, TransactionKind::Income);
        assert_eq!(db.count_categories().unwrap(), 2);
    }

    #[test]
    fn test_create_categories_skips_existing() {
        let db = Database::in_memory().unwrap();

        db.create_categories(&[category("Groceries", TransactionKind::Expense)])
            .unwrap();

        // Same normalized name, so only Dining is new
        let (categories, created) = db
            .create_categories(&[
                category(" groceries ", TransactionKind::Expense),
                category("Dining", TransactionKind::Expense),
            ])
            .unwrap();

        assert_eq!(created, 1);
        assert_eq!(categories.len(), 2);
        // First spelling survives the ignored re-insert
        assert_eq!(categories[0].name, "Dining");
        assert_eq!(categories[1].name, "Groceries");
    }

    #[test]
    fn test_list_categories_is_name_ordered() {
        let db = Database::in_memory().unwrap();

        db.create_categories(&[
            category("Travel", TransactionKind::Expense),
            category("Dining", TransactionKind::Expense),
            category("Groceries", TransactionKind::Expense),
        ])
        .unwrap();

        let names: Vec<String> = db
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Dining", "Groceries", "Travel"]);
    }

    #[test]
    fn test_duplicate_categories_within_batch() {
        let db = Database::in_memory().unwrap();

        let (categories, created) = db
            .create_categories(&[
                category("Travel", TransactionKind::Expense),
                category("TRAVEL", TransactionKind::Expense),
            ])
            .unwrap();

        assert_eq!(created, 1);
        assert_eq!(categories.len(), 1);
    }

    #[test]
    fn test_same_name_different_type_is_distinct() {
        let db = Database::in_memory().unwrap();

        let (categories, created) = db
            .create_categories(&[
                category("Consulting", TransactionKind::Income),
                category("Consulting", TransactionKind::Expense),
            ])
            .unwrap();

        assert_eq!(created, 2);
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn test_unique_index_rejects_raw_duplicates() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        conn.execute(
            "INSERT INTO categories (name, type) VALUES ('Rent', 'expense')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO categories (name, type) VALUES ('  rent  ', 'expense')",
            [],
        );
        assert!(
            result.is_err(),
            "Duplicate normalized category name should fail"
        );
    }

    #[test]
    fn test_insert_and_list_transactions() {
        let db = Database::in_memory().unwrap();

        let inserted = db
            .insert_transactions(&[
                transaction("2024-06-01", "Coffee", 3.5),
                transaction("2024-06-15", "Groceries", 42.1),
            ])
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(db.count_transactions().unwrap(), 2);

        let transactions = db.list_transactions(10).unwrap();
        assert_eq!(transactions.len(), 2);
        // Newest first
        assert_eq!(transactions[0].description, "Groceries");
        assert_eq!(
            transactions[0].occurred_on,
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
        assert_eq!(transactions[1].description, "Coffee");
        assert_eq!(transactions[1].amount, 3.5);
        assert_eq!(transactions[1].source.as_deref(), Some("csv"));
    }

    #[test]
    fn test_list_transactions_limit() {
        let db = Database::in_memory().unwrap();

        db.insert_transactions(&[
            transaction("2024-06-01", "a", 1.0),
            transaction("2024-06-02", "b", 2.0),
            transaction("2024-06-03", "c", 3.0),
        ])
        .unwrap();

        let transactions = db.list_transactions(2).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].description, "c");
    }

    #[test]
    fn test_transaction_category_link() {
        let db = Database::in_memory().unwrap();

        let (categories, _) = db
            .create_categories(&[category("Cafe", TransactionKind::Expense)])
            .unwrap();
        let category_id = categories[0].id;

        let mut tx = transaction("2024-06-01", "Coffee", 3.5);
        tx.category_id = Some(category_id);
        db.insert_transactions(&[tx]).unwrap();

        let transactions = db.list_transactions(10).unwrap();
        assert_eq!(transactions[0].category_id, Some(category_id));
    }

    #[test]
    fn test_insert_transactions_is_atomic() {
        let db = Database::in_memory().unwrap();

        let good = transaction("2024-06-01", "ok", 1.0);
        let mut bad = transaction("2024-06-02", "dangling category", 2.0);
        bad.category_id = Some(9999);

        let result = db.insert_transactions(&[good, bad]);
        assert!(result.is_err(), "foreign key violation should fail the batch");
        assert_eq!(
            db.count_transactions().unwrap(),
            0,
            "failed batch should insert nothing"
        );
    }

    #[test]
    fn test_reopen_existing_database() {
        let db = Database::in_memory().unwrap();
        db.create_categories(&[category("Groceries", TransactionKind::Expense)])
            .unwrap();

        // Migrations are idempotent on an existing file
        let reopened = Database::new(db.path()).unwrap();
        let categories = reopened.list_categories().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Groceries");
    }
}
