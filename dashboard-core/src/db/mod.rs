//! SQLite implementation of the record store.

mod schema;

pub use schema::SCHEMA;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use serde_json::Value;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{Query, RecordStore, Row, Table};

use schema::{columns, MANAGED_COLUMNS};

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the database in the platform data directory, creating it if needed.
    pub fn open_default() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        tracing::debug!("Opening database at {}", path.display());
        Ok(Self::open(&path)?)
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "partnership-dashboard")
            .context("no home directory to place the database in")?;
        Ok(dirs.data_dir().join("dashboard.db"))
    }

    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        self.lock()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.lock()?;
        f(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn list_rows(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut sql = format!("SELECT * FROM {}", table);
        let mut values = Vec::new();
        let mut clauses = Vec::new();

        for filter in &query.filters {
            check_known(table, &filter.column)?;
            if filter.value.is_null() {
                clauses.push(format!("{} IS NULL", filter.column));
            } else {
                clauses.push(format!("{} = ?", filter.column));
                values.push(to_sql(&filter.column, &filter.value)?);
            }
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let (column, direction) = match &query.order {
            Some(order) => {
                check_known(table, &order.column)?;
                (order.column.as_str(), if order.ascending { "ASC" } else { "DESC" })
            }
            None => ("created_at", "ASC"),
        };
        // rowid breaks ties between rows stamped in the same instant
        sql.push_str(&format!(" ORDER BY {column} {direction}, rowid {direction}"));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(read_row(table, row)?);
        }
        tracing::debug!(table = %table, count = out.len(), "listed rows");
        Ok(out)
    }

    pub fn get_row(&self, table: Table, id: Uuid) -> Result<Option<Row>, StoreError> {
        let conn = self.lock()?;
        select_by_id(&conn, table, id)
    }

    pub fn insert_row(&self, table: Table, fields: Row) -> Result<Row, StoreError> {
        let now = timestamp(Utc::now());
        let id = Uuid::new_v4();

        let mut names = vec!["id".to_string(), "created_at".to_string()];
        let mut values = vec![SqlValue::Text(id.to_string()), SqlValue::Text(now.clone())];
        if has_column(table, "updated_at") {
            names.push("updated_at".into());
            values.push(SqlValue::Text(now.clone()));
        }
        if table == Table::ProjectHistory && !fields.contains_key("entry_date") {
            names.push("entry_date".into());
            values.push(SqlValue::Text(now.clone()));
        }
        for (column, value) in &fields {
            check_writable(table, column)?;
            names.push(column.clone());
            values.push(to_sql(column, value)?);
        }

        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            names.join(", "),
            placeholders
        );

        let conn = self.lock()?;
        conn.execute(&sql, params_from_iter(values))
            .map_err(constraint_error)?;
        tracing::debug!(table = %table, %id, "inserted row");

        select_by_id(&conn, table, id)?.ok_or(StoreError::NotFound { table, id })
    }

    /// Apply a partial update. With `last_seen`, the write only happens if the
    /// stored `updated_at` still matches it.
    pub fn update_row(
        &self,
        table: Table,
        id: Uuid,
        fields: Row,
        last_seen: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        if table.is_immutable() {
            return Err(StoreError::Immutable(table));
        }

        let mut assignments = vec!["updated_at = ?".to_string()];
        let mut values = vec![SqlValue::Text(timestamp(Utc::now()))];
        for (column, value) in &fields {
            check_writable(table, column)?;
            assignments.push(format!("{column} = ?"));
            values.push(to_sql(column, value)?);
        }
        values.push(SqlValue::Text(id.to_string()));

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if let Some(last_seen) = last_seen {
            let current: Option<String> = tx
                .query_row(
                    &format!("SELECT updated_at FROM {table} WHERE id = ?1"),
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(current) = current else {
                return Err(StoreError::NotFound { table, id });
            };
            if parse_timestamp(&current) != Some(last_seen) {
                tracing::debug!(table = %table, %id, "stale update rejected");
                return Err(StoreError::Conflict { table, id });
            }
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            table,
            assignments.join(", ")
        );
        let changed = tx
            .execute(&sql, params_from_iter(values))
            .map_err(constraint_error)?;
        if changed == 0 {
            return Err(StoreError::NotFound { table, id });
        }
        tx.commit()?;

        tracing::debug!(table = %table, %id, fields = fields.len(), "updated row");
        Ok(())
    }

    pub fn delete_row(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        if table.is_immutable() {
            return Err(StoreError::Immutable(table));
        }
        let conn = self.lock()?;
        let removed = conn.execute(
            &format!("DELETE FROM {table} WHERE id = ?1"),
            params![id.to_string()],
        )?;
        tracing::debug!(table = %table, %id, removed, "deleted row");
        Ok(())
    }

    /// Remove every row of a mutable table. Dependent rows follow the
    /// schema's cascade rules.
    pub fn clear(&self, table: Table) -> Result<usize, StoreError> {
        if table.is_immutable() {
            return Err(StoreError::Immutable(table));
        }
        let removed = self.lock()?.execute(&format!("DELETE FROM {table}"), [])?;
        Ok(removed)
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn list(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.list_rows(table, query)
    }

    async fn get(&self, table: Table, id: Uuid) -> Result<Option<Row>, StoreError> {
        self.get_row(table, id)
    }

    async fn insert(&self, table: Table, fields: Row) -> Result<Row, StoreError> {
        self.insert_row(table, fields)
    }

    async fn update(&self, table: Table, id: Uuid, fields: Row) -> Result<(), StoreError> {
        self.update_row(table, id, fields, None)
    }

    async fn update_if_unchanged(
        &self,
        table: Table,
        id: Uuid,
        fields: Row,
        last_seen: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.update_row(table, id, fields, Some(last_seen))
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        self.delete_row(table, id)
    }
}

fn select_by_id(conn: &Connection, table: Table, id: Uuid) -> Result<Option<Row>, StoreError> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {table} WHERE id = ?1"))?;
    let mut rows = stmt.query(params![id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(read_row(table, row)?)),
        None => Ok(None),
    }
}

fn read_row(table: Table, row: &rusqlite::Row<'_>) -> Result<Row, StoreError> {
    let mut out = Row::new();
    for (index, column) in columns(table).iter().enumerate() {
        out.insert(column.to_string(), from_sql(column, row.get_ref(index)?)?);
    }
    Ok(out)
}

fn has_column(table: Table, column: &str) -> bool {
    columns(table).contains(&column)
}

fn check_known(table: Table, column: &str) -> Result<(), StoreError> {
    if has_column(table, column) {
        Ok(())
    } else {
        Err(StoreError::UnknownColumn {
            table,
            column: column.to_string(),
        })
    }
}

fn check_writable(table: Table, column: &str) -> Result<(), StoreError> {
    check_known(table, column)?;
    if MANAGED_COLUMNS.contains(&column) {
        return Err(StoreError::InvalidValue {
            column: column.to_string(),
            reason: "assigned by the store".into(),
        });
    }
    Ok(())
}

fn to_sql(column: &str, value: &Value) -> Result<SqlValue, StoreError> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(*b as i64)),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| n.as_f64().map(SqlValue::Real))
            .ok_or_else(|| StoreError::InvalidValue {
                column: column.to_string(),
                reason: format!("unsupported number {n}"),
            }),
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(StoreError::InvalidValue {
            column: column.to_string(),
            reason: "nested values are not supported".into(),
        }),
    }
}

fn from_sql(column: &str, value: ValueRef<'_>) -> Result<Value, StoreError> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => {
            return Err(StoreError::InvalidValue {
                column: column.to_string(),
                reason: "unexpected blob".into(),
            })
        }
    })
}

fn constraint_error(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Constraint(message.unwrap_or_else(|| failure.to_string()))
        }
        other => StoreError::Database(other),
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort as text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
