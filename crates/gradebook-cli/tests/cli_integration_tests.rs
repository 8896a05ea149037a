//! CLI integration tests
//!
//! Run the built binary against a scratch database in a temporary
//! directory, so no `.env` from the working tree is picked up.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const DIGEST: &str = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gradebook"))
        .current_dir(dir)
        .env_remove("GRADEBOOK_DATABASE_NAME")
        .env_remove("GRADEBOOK_DATABASE_PORT")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn migrated(temp_dir: &TempDir) -> PathBuf {
    let db_path = temp_dir.path().join("school.db");
    let output = run(
        temp_dir.path(),
        &["--database", db_path.to_str().unwrap(), "migrate"],
    );
    assert!(
        output.status.success(),
        "migrate should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    db_path
}

fn seed(db_path: &Path) {
    let conn = Connection::open(db_path).unwrap();
    conn.execute_batch(&format!(
        r#"
        INSERT INTO classes (id, name) VALUES (1, '9А'), (2, '10Б');
        INSERT INTO students (first_name, second_name, patronymic, email, password, school_class_id)
        VALUES ('Пётр', 'Петров', 'Сергеевич', 'petrov@school.ru', '{digest}', 1),
               ('Иван', 'Иванов', 'Сергеевич', 'ivanov@school.ru', '{digest}', 2);
        "#,
        digest = DIGEST
    ))
    .unwrap();
}

#[test]
fn test_cli_migrate_creates_tables() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated(&temp_dir);

    let conn = Connection::open(&db_path).unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'grades'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);

    // A second run is a no-op
    let again = run(
        temp_dir.path(),
        &["--database", db_path.to_str().unwrap(), "migrate"],
    );
    assert!(again.status.success());
}

#[test]
fn test_cli_show_prints_display_form() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated(&temp_dir);
    seed(&db_path);

    let output = run(
        temp_dir.path(),
        &[
            "--database",
            db_path.to_str().unwrap(),
            "show",
            "students",
            "--where",
            "school_class__name=9А",
        ],
    );

    assert!(
        output.status.success(),
        "show should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["Петров Пётр Сергеевич <petrov@school.ru> [9А]"]
    );
}

#[test]
fn test_cli_show_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated(&temp_dir);
    seed(&db_path);

    let output = run(
        temp_dir.path(),
        &["--database", db_path.to_str().unwrap(), "show", "Class", "--json"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let classes: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0]["pk"], 1);
    assert_eq!(classes[0]["name"], "9А");
    assert_eq!(classes[1]["name"], "10Б");
}

#[test]
fn test_cli_student_json_has_no_password() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated(&temp_dir);
    seed(&db_path);

    let output = run(
        temp_dir.path(),
        &["--database", db_path.to_str().unwrap(), "show", "Student", "--json"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains(DIGEST));
    assert!(stdout.contains("petrov@school.ru"));
}

#[test]
fn test_cli_unknown_entity_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated(&temp_dir);

    let output = run(
        temp_dir.path(),
        &["--database", db_path.to_str().unwrap(), "show", "Janitor"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error: unknown entity 'Janitor'"));
}

#[test]
fn test_cli_unknown_condition_reports_attribute() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated(&temp_dir);

    let output = run(
        temp_dir.path(),
        &[
            "--database",
            db_path.to_str().unwrap(),
            "show",
            "Class",
            "--where",
            "colour=red",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_UNKNOWN_ATTRIBUTE"), "stderr: {}", stderr);
}
