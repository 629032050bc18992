//! Integration tests for the areg CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd against
//! registry databases built in temp directories.

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use areg::core::loader::{COLUMNS, DEFAULT_DATABASE, DEFAULT_TABLE};

/// A fixture row: (tag, description, acquisition date)
type Row<'a> = (i64, &'a str, Option<&'a str>);

const STANDARD_ROWS: &[Row<'static>] = &[
    (120, "Laser Printer", Some("15/03/2021")),
    (99, "Scanner", Some("01/01/2010")),
    (42, "Inkjet printer", None),
    (0, "Ignored row", Some("01/01/2000")),
];

/// Helper to get an areg command isolated from the user's config
fn areg(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("areg").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("HOME", dir)
        .env_remove("AREG_DATABASE")
        .env_remove("AREG_TABLE");
    cmd
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Helper to create a registry database in a temp directory
fn setup_registry(rows: &[Row<'_>]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(DEFAULT_DATABASE);
    let conn = Connection::open(&path).unwrap();

    let columns: Vec<String> = COLUMNS.iter().map(|c| quote(c)).collect();
    conn.execute_batch(&format!(
        "CREATE TABLE {} ({});",
        DEFAULT_TABLE,
        columns.join(", ")
    ))
    .unwrap();

    let insert = format!(
        "INSERT INTO {} ({}) VALUES (?1, ?2, 'MATRIZ', 'Almoxarifado', NULL, NULL, 'Acme', 3312, ?3, 2500.0, 'CB-9', 'SN-9')",
        DEFAULT_TABLE,
        columns.join(", ")
    );
    for (tag, description, acquired) in rows {
        conn.execute(&insert, params![tag, description, acquired])
            .unwrap();
    }

    (tmp, path)
}

// ============================================================================
// Basic Commands
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    areg(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Asset Registry Report"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("browse"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    areg(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("areg"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    areg(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("areg"));
}

// ============================================================================
// Check Command
// ============================================================================

#[test]
fn test_check_reports_connection() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Connection established"));
}

#[test]
fn test_check_missing_database_fails() {
    let tmp = TempDir::new().unwrap();
    areg(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    assert!(!tmp.path().join(DEFAULT_DATABASE).exists());
}

// ============================================================================
// Search Command
// ============================================================================

#[test]
fn test_search_text_and_range_by_tag() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "PRINTER", "--min-age", "0", "--max-age", "200", "-f", "id"])
        .assert()
        .success()
        .stdout("000120\n000042\n");
}

#[test]
fn test_search_age_range_only() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "--min-age", "10", "-f", "id"])
        .assert()
        .success()
        .stdout("000099\n");
}

#[test]
fn test_search_matches_tag_digits() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "0009", "-f", "id"])
        .assert()
        .success()
        .stdout("000099\n");
}

#[test]
fn test_search_excludes_zero_tag_rows() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "ignored"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No assets found"));
}

#[test]
fn test_search_without_filter_asks_for_one() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .arg("search")
        .assert()
        .success()
        .stdout(predicate::str::contains("Please enter a filter"));
}

#[test]
fn test_search_zero_bounds_depend_on_gate() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "--min-age", "0", "--max-age", "0", "-f", "id"])
        .assert()
        .success()
        .stdout("000042\n");

    areg(tmp.path())
        .args(["search", "--min-age", "0", "--max-age", "0", "--gate", "truthy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Please enter a filter"));
}

#[test]
fn test_search_count() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "r", "--count"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_search_limit() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "r", "-n", "1", "-f", "id"])
        .assert()
        .success()
        .stdout("000120\n");
}

#[test]
fn test_search_table_output() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "scanner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TAG"))
        .stdout(predicate::str::contains("000099"))
        .stdout(predicate::str::contains("Almoxarifado"))
        .stdout(predicate::str::contains("01/01/2010"));
}

#[test]
fn test_search_json_output() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    let output = areg(tmp.path())
        .args(["search", "inkjet", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let row = &rows[0];
    assert_eq!(row["tag"], "000042");
    assert_eq!(row["holder"], "nan");
    assert_eq!(row["acquisition_date"], serde_json::Value::Null);
    assert_eq!(row["age_years"], 0.0);
    assert_eq!(row["document_number"], 3312);
    assert_eq!(row["acquisition_value"], 2500.0);
    assert_eq!(row["selected"], true);
}

#[test]
fn test_search_csv_output() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "laser", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("tag,description,"))
        .stdout(predicate::str::contains("000120,Laser Printer,MATRIZ"));
}

#[test]
fn test_search_rejects_nan_age() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["search", "--min-age", "nan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a number"));
}

#[test]
fn test_two_digit_year_fails_load() {
    let (tmp, _) = setup_registry(&[(5, "Chair", Some("01/01/20"))]);
    areg(tmp.path())
        .args(["search", "chair"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("01/01/20"));
}

#[test]
fn test_search_missing_database_fails() {
    let tmp = TempDir::new().unwrap();
    areg(tmp.path())
        .args(["--database", "nowhere.sqlite", "search", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_search_missing_table_fails() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .args(["--table", "inventario", "search", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inventario"));
}

// ============================================================================
// Date Parsing
// ============================================================================

#[test]
fn test_invalid_date_fails_strict_load() {
    let (tmp, _) = setup_registry(&[
        (5, "Chair", Some("01/01/2020")),
        (6, "Desk", Some("31/02/2020")),
    ]);
    areg(tmp.path())
        .args(["search", "chair"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("31/02/2020"));
}

#[test]
fn test_lenient_config_keeps_loading() {
    let (tmp, _) = setup_registry(&[
        (5, "Chair", Some("01/01/2020")),
        (6, "Desk", Some("31/02/2020")),
    ]);
    fs::write(tmp.path().join("areg.yaml"), "date_parsing: lenient\n").unwrap();

    areg(tmp.path())
        .args(["search", "desk", "-f", "id"])
        .assert()
        .success()
        .stdout("000006\n");
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_sets_database_and_null_text() {
    let (tmp, path) = setup_registry(STANDARD_ROWS);
    let work = tmp.path().join("work");
    fs::create_dir(&work).unwrap();
    fs::write(
        work.join("areg.yaml"),
        format!("database: {}\nnull_text: empty\n", path.display()),
    )
    .unwrap();

    let output = areg(&work)
        .args(["search", "scanner", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["holder"], "");
}

#[test]
fn test_env_var_sets_database() {
    let (tmp, path) = setup_registry(STANDARD_ROWS);
    let work = tmp.path().join("work");
    fs::create_dir(&work).unwrap();

    areg(&work)
        .env("AREG_DATABASE", &path)
        .arg("check")
        .assert()
        .success();
}

// ============================================================================
// Status Command
// ============================================================================

#[test]
fn test_status_dashboard() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    areg(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Asset Registry Status"))
        .stdout(predicate::str::contains("Undated"));
}

#[test]
fn test_status_json() {
    let (tmp, _) = setup_registry(STANDARD_ROWS);
    let output = areg(tmp.path())
        .args(["status", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["rows"], 3);
    assert_eq!(status["undated"], 1);
    assert_eq!(status["age_min"], 0.0);
    assert_eq!(status["table"], "cadastro_patrimonio");
    assert_eq!(status["date_parsing"], "strict");
}
