#![allow(dead_code)]

use gradebook_core::model::{Class, NewPerson, Subject, Teacher};
use gradebook_core_types::Sensitive;
use gradebook_store::migrations::apply_migrations;
use gradebook_store::{db, ConnectionConfig, ConnectionManager, EntityManager};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

static MANAGER_LOCK: Mutex<()> = Mutex::new(());

/// Serialise tests that build the process-wide connection manager
///
/// Take the guard before creating the manager so the manager is dropped
/// first.
pub fn manager_lock() -> MutexGuard<'static, ()> {
    MANAGER_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scratch database file that lives as long as the value
pub struct TestDb {
    _dir: TempDir,
    pub path: PathBuf,
}

/// Empty database file, no schema
pub fn empty_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradebook.db");
    TestDb { _dir: dir, path }
}

/// Database with the school schema applied
pub fn migrated_db() -> TestDb {
    let test_db = empty_db();
    let mut conn = db::open_configured(&test_db.path).unwrap();
    apply_migrations(&mut conn).unwrap();
    test_db
}

pub fn manager(test_db: &TestDb) -> ConnectionManager {
    ConnectionManager::new(ConnectionConfig::for_database(&test_db.path)).unwrap()
}

pub fn person<'a>(first_name: &'a str, second_name: &'a str, email: &'a str) -> NewPerson<'a> {
    NewPerson {
        first_name,
        second_name,
        patronymic: "Сергеевич",
        email,
        password: Sensitive::new("Qwerty-123".to_string()),
    }
}

/// Persist a class and return it with its identity
pub fn saved_class(manager: &ConnectionManager, name: &str) -> Class {
    let mut class = Class::new(name).unwrap();
    EntityManager::new(manager).create(&mut class, true).unwrap();
    class
}

pub fn saved_subject(manager: &ConnectionManager, name: &str) -> Subject {
    let mut subject = Subject::new(name).unwrap();
    EntityManager::new(manager).create(&mut subject, true).unwrap();
    subject
}

pub fn saved_teacher(manager: &ConnectionManager, email: &str) -> Teacher {
    let mut teacher = Teacher::new(person("анна", "смирнова", email), Some("Математика")).unwrap();
    EntityManager::new(manager).create(&mut teacher, true).unwrap();
    teacher
}
