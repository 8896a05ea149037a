#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use gradebook_core::entity::{Attribute, Entity, Record};
use gradebook_core::errors::ExErrorKind;
use gradebook_core::hydration::hydrate_rows;
use gradebook_core::logging_facility::test_capture::init_test_capture;
use gradebook_core::queries::build_fetch_all;
use gradebook_core::schema::Schema;
use gradebook_core::statement::Statement;
use gradebook_core::value::Value;
use gradebook_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use gradebook_store::{ConnectionConfig, ConnectionManager};

static TEST_TABLE: Schema = Schema {
    entity: "TestTable",
    table: "test_table",
    attributes: &["first_attr", "second_attr"],
    relations: &[],
};

#[derive(Debug)]
struct TestRow {
    first_attr: i64,
    second_attr: String,
}

impl Entity for TestRow {
    fn schema() -> &'static Schema {
        &TEST_TABLE
    }
    fn pk(&self) -> Option<i64> {
        None
    }
    fn set_pk(&mut self, _pk: i64) {}
    fn attribute(&self, name: &str) -> Option<Attribute> {
        match name {
            "first_attr" => Some(Attribute::Value(self.first_attr.into())),
            "second_attr" => Some(Attribute::Value(self.second_attr.clone().into())),
            _ => None,
        }
    }
    fn from_record(record: &mut Record) -> gradebook_core::Result<Self> {
        Ok(TestRow {
            first_attr: record.take_i64("first_attr")?,
            second_attr: record.take_text("second_attr")?,
        })
    }
    fn to_record(&self) -> gradebook_core::Result<Record> {
        Record::new(&TEST_TABLE)
            .with("first_attr", self.first_attr)?
            .with("second_attr", &self.second_attr)
    }
}

fn create_test_table(manager: &ConnectionManager) {
    manager.enqueue(Statement::without_output(
        "CREATE TABLE test_table (first_attr int, second_attr varchar)",
        vec![],
    ));
    manager.flush_autocommit().unwrap();
}

fn insert_row(first: i64, second: &str) -> Statement {
    Statement::without_output(
        "INSERT INTO test_table (first_attr, second_attr) VALUES (%s, %s)",
        vec![Value::Integer(first), Value::from(second)],
    )
}

fn count_rows(manager: &ConnectionManager) -> i64 {
    manager.enqueue(Statement::with_output("SELECT COUNT(*) FROM test_table", vec![]));
    manager.flush_autocommit().unwrap();
    manager.read_result().unwrap()[0][0].as_i64().unwrap()
}

#[test]
fn test_fetch_all_raw_and_hydrated() {
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let manager = common::manager(&test_db);
    create_test_table(&manager);

    manager.enqueue(insert_row(1, "text1"));
    manager.flush_autocommit().unwrap();

    manager.enqueue(build_fetch_all(&TEST_TABLE));
    manager.flush_autocommit().unwrap();
    let rows = manager.read_result().unwrap();
    assert_eq!(rows, vec![vec![Value::Integer(1), Value::from("text1")]]);

    let hydrated: Vec<TestRow> = hydrate_rows(&rows).unwrap();
    assert_eq!(hydrated.len(), 1);
    assert_eq!(hydrated[0].first_attr, 1);
    assert_eq!(hydrated[0].second_attr, "text1");
}

#[test]
fn test_read_result_is_read_once() {
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let manager = common::manager(&test_db);

    manager.enqueue(Statement::with_output("SELECT 1", vec![]));
    manager.flush_autocommit().unwrap();

    assert_eq!(manager.read_result(), Some(vec![vec![Value::Integer(1)]]));
    assert_eq!(manager.read_result(), None);
}

#[test]
fn test_last_rows_statement_wins() {
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let manager = common::manager(&test_db);

    manager.enqueue(Statement::with_output("SELECT %s", vec![Value::from("first")]));
    manager.enqueue(Statement::with_output("SELECT %s", vec![Value::from("second")]));
    manager.flush_autocommit().unwrap();

    assert_eq!(manager.read_result(), Some(vec![vec![Value::from("second")]]));
}

#[test]
fn test_flush_with_empty_queue_fails() {
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let manager = common::manager(&test_db);

    let err = manager.flush_autocommit().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NoPendingStatements);
    let err = manager.flush_transactional().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NoPendingStatements);
}

#[test]
fn test_autocommit_failure_keeps_earlier_statements() {
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let manager = common::manager(&test_db);
    create_test_table(&manager);

    manager.enqueue(insert_row(1, "kept"));
    manager.enqueue(Statement::without_output("INSERT INTO missing_table VALUES (1)", vec![]));
    manager.enqueue(insert_row(2, "never run"));
    let err = manager.flush_autocommit().unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(manager.pending_len(), 0);
    assert_eq!(count_rows(&manager), 1);
}

#[test]
fn test_transactional_failure_rolls_back_batch() {
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let manager = common::manager(&test_db);
    create_test_table(&manager);

    manager.enqueue(insert_row(1, "rolled back"));
    manager.enqueue(Statement::without_output("INSERT INTO missing_table VALUES (1)", vec![]));
    let err = manager.flush_transactional().unwrap_err();

    assert!(err.message().contains("missing_table"));
    assert_eq!(manager.pending_len(), 0);
    assert_eq!(count_rows(&manager), 0);
}

#[test]
fn test_transactional_success_commits_in_order() {
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let manager = common::manager(&test_db);
    create_test_table(&manager);

    manager.enqueue(insert_row(1, "a"));
    manager.enqueue(insert_row(2, "b"));
    manager.enqueue(Statement::with_output(
        "SELECT first_attr FROM test_table ORDER BY rowid",
        vec![],
    ));
    manager.flush_transactional().unwrap();

    assert_eq!(
        manager.read_result(),
        Some(vec![vec![Value::Integer(1)], vec![Value::Integer(2)]])
    );
    assert_eq!(manager.last_insert_id(), Some(2));
}

#[test]
fn test_last_insert_id_follows_inserted_rows_only() {
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let manager = common::manager(&test_db);
    create_test_table(&manager);
    assert_eq!(manager.last_insert_id(), None);

    manager.enqueue(Statement::without_output(
        "-- seed\n  insert into test_table (first_attr, second_attr) VALUES (%s, %s)",
        vec![Value::Integer(7), Value::from("lower")],
    ));
    manager.flush_autocommit().unwrap();
    assert_eq!(manager.last_insert_id(), Some(1));

    manager.enqueue(Statement::without_output(
        "UPDATE test_table SET second_attr = %s",
        vec![Value::from("changed")],
    ));
    manager.enqueue(Statement::without_output("DELETE FROM test_table", vec![]));
    manager.flush_autocommit().unwrap();
    assert_eq!(manager.last_insert_id(), None);
}

#[test]
fn test_second_manager_is_rejected_until_first_dropped() {
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let first = common::manager(&test_db);

    let err = ConnectionManager::new(ConnectionConfig::for_database(&test_db.path)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::AlreadyInitialised);

    drop(first);
    assert!(ConnectionManager::new(ConnectionConfig::for_database(&test_db.path)).is_ok());
}

#[test]
fn test_flush_emits_start_and_end_events() {
    let capture = init_test_capture();
    let _guard = common::manager_lock();
    let test_db = common::empty_db();
    let manager = common::manager(&test_db);

    manager.enqueue(Statement::with_output("SELECT 1", vec![]));
    manager.flush_autocommit().unwrap();
    manager.enqueue(Statement::without_output("NOT SQL", vec![]));
    assert!(manager.flush_autocommit().is_err());

    capture.assert_event_exists("connection.flush", EVENT_START);
    capture.assert_event_exists("connection.flush", EVENT_END);
    let errors = capture.count_events(|e| {
        e.op.as_deref() == Some("connection.flush")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.fields.get("err.code").map(String::as_str) == Some("ERR_PERSISTENCE")
    });
    assert!(errors >= 1);
}
