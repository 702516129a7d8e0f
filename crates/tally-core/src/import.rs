//! Transaction import reconciliation
//!
//! Takes a raw import payload, validates it all-or-nothing, creates any
//! categories the batch references that the database does not have yet, and
//! inserts the transactions in a single batch. Unlike CSV parsing, which
//! tolerates bad rows, a payload with any invalid row is rejected whole so
//! a caller never ends up with a partial import.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    ImportSummary, IncomingTransaction, NewCategory, NewTransaction, TransactionKind,
};

/// Category identity: type plus the trimmed, lowercased name
fn normalize_category_key(name: &str, kind: TransactionKind) -> String {
    format!("{}:{}", kind.as_str(), name.trim().to_lowercase())
}

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

/// Validate a raw import payload.
///
/// Either every row is acceptable or the whole payload is rejected with one
/// `Error::Validation` carrying all row messages joined by single spaces.
fn validate_transactions(payload: &Value) -> Result<Vec<IncomingTransaction>> {
    let Some(body) = payload.as_object() else {
        return Err(Error::Validation(
            "Request body must be an object.".to_string(),
        ));
    };

    let Some(items) = body.get("transactions").and_then(Value::as_array) else {
        return Err(Error::Validation(
            "`transactions` must be an array of transaction objects.".to_string(),
        ));
    };

    if items.is_empty() {
        return Err(Error::Validation(
            "`transactions` array must contain at least one item.".to_string(),
        ));
    }

    let mut parsed: Vec<IncomingTransaction> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let row_number = index + 1;

        let Some(row) = item.as_object() else {
            errors.push(format!("Row {}: expected an object.", row_number));
            continue;
        };

        let occurred_on = match row.get("occurredOn").and_then(Value::as_str) {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => {
                errors.push(format!("Row {}: occurredOn is required.", row_number));
                continue;
            }
        };

        let description = match row.get("description").and_then(Value::as_str) {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => {
                errors.push(format!("Row {}: description is required.", row_number));
                continue;
            }
        };

        let amount = match row.get("amount").and_then(Value::as_f64) {
            Some(value) => value,
            None => {
                errors.push(format!("Row {}: amount must be a number.", row_number));
                continue;
            }
        };

        let kind = match row
            .get("type")
            .and_then(Value::as_str)
            .and_then(|value| value.parse::<TransactionKind>().ok())
        {
            Some(kind) => kind,
            None => {
                errors.push(format!(
                    "Row {}: type must be \"income\" or \"expense\".",
                    row_number
                ));
                continue;
            }
        };

        parsed.push(IncomingTransaction {
            occurred_on,
            description,
            amount,
            kind,
            category: non_blank_string(row.get("category")),
            notes: non_blank_string(row.get("notes")),
            source: non_blank_string(row.get("source")),
        });
    }

    if parsed.is_empty() {
        let mut message = "No valid transactions provided.".to_string();
        if !errors.is_empty() {
            message.push_str(&format!(" Errors: {}", errors.join(" ")));
        }
        return Err(Error::Validation(message));
    }

    if !errors.is_empty() {
        return Err(Error::Validation(errors.join(" ")));
    }

    Ok(parsed)
}

struct CategoryReconciliation {
    /// Normalized key -> category id, for every category in the database
    mappings: BTreeMap<String, i64>,
    created: usize,
}

/// Make sure every category the batch references exists.
///
/// Referenced categories are deduplicated by normalized key with the first
/// spelling winning, compared against the full category list, and the
/// missing ones inserted. A concurrent import creating the same category is
/// fine: the insert ignores the conflict and the re-read picks up whichever
/// row won.
fn ensure_categories(
    db: &Database,
    transactions: &[IncomingTransaction],
) -> Result<CategoryReconciliation> {
    let mut requested: Vec<(String, NewCategory)> = Vec::new();
    for txn in transactions {
        let Some(category) = &txn.category else {
            continue;
        };
        let key = normalize_category_key(category, txn.kind);
        if !requested.iter().any(|(existing, _)| existing == &key) {
            requested.push((
                key,
                NewCategory {
                    name: category.trim().to_string(),
                    kind: txn.kind,
                },
            ));
        }
    }

    if requested.is_empty() {
        return Ok(CategoryReconciliation {
            mappings: BTreeMap::new(),
            created: 0,
        });
    }

    let existing = db
        .list_categories()
        .map_err(|e| Error::Import(format!("Failed to load categories: {}", e)))?;
    let mut mappings: BTreeMap<String, i64> = existing
        .iter()
        .map(|cat| (normalize_category_key(&cat.name, cat.kind), cat.id))
        .collect();

    let missing: Vec<NewCategory> = requested
        .into_iter()
        .filter(|(key, _)| !mappings.contains_key(key))
        .map(|(_, category)| category)
        .collect();

    if missing.is_empty() {
        return Ok(CategoryReconciliation {
            mappings,
            created: 0,
        });
    }

    let (all, created) = db
        .create_categories(&missing)
        .map_err(|e| Error::Import(format!("Failed to create categories: {}", e)))?;

    mappings = all
        .iter()
        .map(|cat| (normalize_category_key(&cat.name, cat.kind), cat.id))
        .collect();

    Ok(CategoryReconciliation { mappings, created })
}

/// Validate an import payload and reconcile it into the database.
///
/// Returns a summary with the insert count, how many categories this import
/// created, and the full normalized-key-to-id category mapping (empty when
/// the batch referenced no categories at all).
pub fn import_transactions(db: &Database, payload: &Value) -> Result<ImportSummary> {
    let validated = validate_transactions(payload)?;

    let reconciliation = ensure_categories(db, &validated)?;

    let mut inserts: Vec<NewTransaction> = Vec::with_capacity(validated.len());
    for txn in &validated {
        // Dates were only checked for presence; a malformed one fails the
        // import here, before anything is written
        let occurred_on = NaiveDate::parse_from_str(&txn.occurred_on, "%Y-%m-%d")
            .map_err(|e| Error::Import(format!("Failed to insert transactions: {}", e)))?;

        let category_id = txn.category.as_ref().and_then(|name| {
            reconciliation
                .mappings
                .get(&normalize_category_key(name, txn.kind))
                .copied()
        });

        inserts.push(NewTransaction {
            occurred_on,
            description: txn.description.clone(),
            amount: txn.amount,
            kind: txn.kind,
            category_id,
            notes: txn.notes.clone(),
            source: txn.source.clone().or_else(|| Some("csv".to_string())),
        });
    }

    let inserted = db
        .insert_transactions(&inserts)
        .map_err(|e| Error::Import(format!("Failed to insert transactions: {}", e)))?;

    debug!(
        "Imported {} transactions ({} categories created)",
        inserted, reconciliation.created
    );

    Ok(ImportSummary {
        inserted_count: inserted,
        failed_count: validated.len() - inserted,
        created_categories: reconciliation.created,
        category_mappings: reconciliation.mappings,
        errors: vec![],
    })
}
