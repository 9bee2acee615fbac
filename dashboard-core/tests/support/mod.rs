#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use dashboard_core::{Database, Query, RecordStore, Row, StoreError, Table};

pub fn setup_db() -> Database {
    let db = Database::open_memory().expect("Failed to create test database");
    db.migrate().expect("Failed to migrate test database");
    db
}

/// A [`Database`] whose writes or single-record reads can be switched to fail.
#[derive(Clone)]
pub struct FlakyStore {
    pub db: Database,
    reject: Arc<Mutex<Option<String>>>,
    reject_reads: Arc<Mutex<Option<String>>>,
}

impl FlakyStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            reject: Arc::new(Mutex::new(None)),
            reject_reads: Arc::new(Mutex::new(None)),
        }
    }

    /// Fail every following update and delete with `message`.
    pub fn reject_writes(&self, message: &str) {
        *self.reject.lock().unwrap() = Some(message.to_string());
    }

    pub fn accept_writes(&self) {
        *self.reject.lock().unwrap() = None;
    }

    /// Fail every following `get` with `message`. Lists still succeed.
    pub fn reject_reads(&self, message: &str) {
        *self.reject_reads.lock().unwrap() = Some(message.to_string());
    }

    fn check(&self) -> Result<(), StoreError> {
        check(&self.reject)
    }
}

fn check(flag: &Mutex<Option<String>>) -> Result<(), StoreError> {
    match flag.lock().unwrap().clone() {
        Some(message) => Err(StoreError::Rejected(message)),
        None => Ok(()),
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn list(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.db.list(table, query).await
    }

    async fn get(&self, table: Table, id: Uuid) -> Result<Option<Row>, StoreError> {
        check(&self.reject_reads)?;
        self.db.get(table, id).await
    }

    async fn insert(&self, table: Table, fields: Row) -> Result<Row, StoreError> {
        self.db.insert(table, fields).await
    }

    async fn update(&self, table: Table, id: Uuid, fields: Row) -> Result<(), StoreError> {
        self.check()?;
        self.db.update(table, id, fields).await
    }

    async fn update_if_unchanged(
        &self,
        table: Table,
        id: Uuid,
        fields: Row,
        last_seen: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.check()?;
        self.db.update_if_unchanged(table, id, fields, last_seen).await
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        self.check()?;
        self.db.delete(table, id).await
    }
}

/// A [`Database`] that remembers which store calls were made.
#[derive(Clone)]
pub struct RecordingStore {
    pub db: Database,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Calls so far as "<method> <table>", oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, method: &str, table: Table) {
        self.calls.lock().unwrap().push(format!("{method} {table}"));
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn list(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.record("list", table);
        self.db.list(table, query).await
    }

    async fn get(&self, table: Table, id: Uuid) -> Result<Option<Row>, StoreError> {
        self.record("get", table);
        self.db.get(table, id).await
    }

    async fn insert(&self, table: Table, fields: Row) -> Result<Row, StoreError> {
        self.record("insert", table);
        self.db.insert(table, fields).await
    }

    async fn update(&self, table: Table, id: Uuid, fields: Row) -> Result<(), StoreError> {
        self.record("update", table);
        self.db.update(table, id, fields).await
    }

    async fn update_if_unchanged(
        &self,
        table: Table,
        id: Uuid,
        fields: Row,
        last_seen: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.record("update_if_unchanged", table);
        self.db.update_if_unchanged(table, id, fields, last_seen).await
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        self.record("delete", table);
        self.db.delete(table, id).await
    }
}
