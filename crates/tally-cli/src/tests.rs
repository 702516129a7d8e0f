//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::PathBuf;

use tally_core::ParseOptions;

use crate::commands::{self, truncate};

fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn sample_csv(dir: &tempfile::TempDir) -> PathBuf {
    write_csv(
        dir,
        "statement.csv",
        "Date,Description,Amount,Category\n\
         2024-06-01,Coffee,-3.50,Cafe\n\
         2024-06-02,Salary,3000.00,\n\
         2024-06-01,Coffee,-3.50,Cafe\n",
    )
}

// ========== Parse Option Tests ==========

#[test]
fn test_build_parse_options_defaults() {
    let options = commands::build_parse_options(",", ".", None, &[]).unwrap();
    assert_eq!(options.delimiter, ',');
    assert_eq!(
        options.decimal_separator,
        tally_core::DecimalSeparator::Dot
    );
    assert!(options.source_name.is_none());
    assert!(options.extra_aliases.is_empty());
}

#[test]
fn test_build_parse_options_semicolon_comma() {
    let options =
        commands::build_parse_options(";", ",", Some("bank".to_string()), &[]).unwrap();
    assert_eq!(options.delimiter, ';');
    assert_eq!(
        options.decimal_separator,
        tally_core::DecimalSeparator::Comma
    );
    assert_eq!(options.source_name.as_deref(), Some("bank"));
}

#[test]
fn test_build_parse_options_rejects_long_delimiter() {
    let result = commands::build_parse_options(";;", ".", None, &[]);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("single character"));
}

#[test]
fn test_build_parse_options_aliases() {
    let aliases = vec!["Posting Day=date".to_string(), "Narrative=notes".to_string()];
    let options = commands::build_parse_options(",", ".", None, &aliases).unwrap();
    assert_eq!(options.extra_aliases.len(), 2);
    assert_eq!(options.extra_aliases[0].0, "Posting Day");
    assert_eq!(options.extra_aliases[0].1, tally_core::CsvField::Date);
}

#[test]
fn test_build_parse_options_rejects_bad_alias() {
    let result = commands::build_parse_options(",", ".", None, &["nonsense".to_string()]);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid alias"));

    let result = commands::build_parse_options(",", ".", None, &["col=wat".to_string()]);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unknown CSV field"));
}

// ========== Init / Status Command Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");

    let result = commands::cmd_init(&db_path);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_cmd_status_without_database() {
    let dir = tempfile::tempdir().unwrap();
    let result = commands::cmd_status(&dir.path().join("missing.db"));
    assert!(result.is_ok());
}

#[test]
fn test_cmd_status_with_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");
    commands::cmd_init(&db_path).unwrap();

    let result = commands::cmd_status(&db_path);
    assert!(result.is_ok());
}

// ========== Parse Command Tests ==========

#[test]
fn test_cmd_parse_summary() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_csv(&dir);

    let result = commands::cmd_parse(&file, ParseOptions::default(), false);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_parse_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_csv(&dir);

    let result = commands::cmd_parse(&file, ParseOptions::default(), true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_parse_missing_required_columns() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "bad.csv", "Description,Amount\nCoffee,-3.50\n");

    let result = commands::cmd_parse(&file, ParseOptions::default(), false);
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("missing required columns"));
}

#[test]
fn test_cmd_parse_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nope.csv");

    let result = commands::cmd_parse(&file, ParseOptions::default(), false);
    assert!(result.is_err());
}

// ========== Import Command Tests ==========

#[tokio::test]
async fn test_cmd_import_skips_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");
    let file = sample_csv(&dir);

    let result =
        commands::cmd_import(&db_path, &file, ParseOptions::default(), false, None, None).await;
    assert!(result.is_ok());

    let db = commands::open_db(&db_path).unwrap();
    assert_eq!(db.count_transactions().unwrap(), 2);
    assert_eq!(db.count_categories().unwrap(), 1);
}

#[tokio::test]
async fn test_cmd_import_include_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");
    let file = sample_csv(&dir);

    let result =
        commands::cmd_import(&db_path, &file, ParseOptions::default(), true, None, None).await;
    assert!(result.is_ok());

    let db = commands::open_db(&db_path).unwrap();
    assert_eq!(db.count_transactions().unwrap(), 3);
}

#[tokio::test]
async fn test_cmd_import_empty_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");
    let file = write_csv(&dir, "empty.csv", "");

    let result =
        commands::cmd_import(&db_path, &file, ParseOptions::default(), false, None, None).await;
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("No importable transactions"));
}

#[tokio::test]
async fn test_cmd_import_second_run_reuses_categories() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");
    let file = sample_csv(&dir);

    commands::cmd_import(&db_path, &file, ParseOptions::default(), false, None, None)
        .await
        .unwrap();
    commands::cmd_import(&db_path, &file, ParseOptions::default(), false, None, None)
        .await
        .unwrap();

    let db = commands::open_db(&db_path).unwrap();
    assert_eq!(db.count_categories().unwrap(), 1);
    assert_eq!(db.count_transactions().unwrap(), 4);
}

// ========== Listing Command Tests ==========

#[tokio::test]
async fn test_cmd_transactions_list() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");
    let file = sample_csv(&dir);

    commands::cmd_import(&db_path, &file, ParseOptions::default(), false, None, None)
        .await
        .unwrap();

    let db = commands::open_db(&db_path).unwrap();
    assert!(commands::cmd_transactions_list(&db, 20).is_ok());
    assert!(commands::cmd_transactions_list(&db, 1).is_ok());
}

#[test]
fn test_cmd_transactions_list_empty() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");
    commands::cmd_init(&db_path).unwrap();

    let db = commands::open_db(&db_path).unwrap();
    assert!(commands::cmd_transactions_list(&db, 20).is_ok());
}

#[tokio::test]
async fn test_cmd_categories_list() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");
    let file = sample_csv(&dir);

    commands::cmd_import(&db_path, &file, ParseOptions::default(), false, None, None)
        .await
        .unwrap();

    let db = commands::open_db(&db_path).unwrap();
    assert!(commands::cmd_categories_list(&db).is_ok());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly-10", 10), "exactly-10");
    assert_eq!(truncate("a longer description", 10), "a longe...");
}

#[test]
fn test_truncate_lands_on_char_boundary() {
    // A multi-byte char straddling the cut point must not panic
    let description = format!("{}établissement", "a".repeat(36));
    assert_eq!(truncate(&description, 40), format!("{}...", "a".repeat(36)));

    assert_eq!(truncate("Café Près de la Gare, Paris 10e", 10), "Café P...");
}
