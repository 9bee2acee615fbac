//! The record store seam.
//!
//! Everything the dashboard persists goes through [`RecordStore`], a small
//! table-addressed CRUD interface over field/value rows. The SQLite
//! [`Database`](crate::db::Database) implements it directly; the HTTP client in
//! the server crate implements it by forwarding to the API.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;

/// A stored row as a field/value map.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Ideas,
    Projects,
    Tasks,
    ProjectHistory,
    Comments,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Self::Ideas,
        Self::Projects,
        Self::Tasks,
        Self::ProjectHistory,
        Self::Comments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ideas => "ideas",
            Self::Projects => "projects",
            Self::Tasks => "tasks",
            Self::ProjectHistory => "project_history",
            Self::Comments => "comments",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ideas" => Some(Self::Ideas),
            "projects" => Some(Self::Projects),
            "tasks" => Some(Self::Tasks),
            "project_history" => Some(Self::ProjectHistory),
            "comments" => Some(Self::Comments),
            _ => None,
        }
    }

    /// History entries and comments are append-only.
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::ProjectHistory | Self::Comments)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter on one column. A `null` value matches `IS NULL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub column: String,
    #[serde(default = "ascending_default")]
    pub ascending: bool,
}

fn ascending_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn is_null(self, column: &str) -> Self {
        self.eq(column, Value::Null)
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn newest_first() -> Self {
        Self::new().order_by("created_at", false)
    }

    pub fn oldest_first() -> Self {
        Self::new().order_by("created_at", true)
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError>;

    async fn get(&self, table: Table, id: Uuid) -> Result<Option<Row>, StoreError>;

    /// Insert a row. The store assigns `id` and timestamps and returns the
    /// created row.
    async fn insert(&self, table: Table, fields: Row) -> Result<Row, StoreError>;

    async fn update(&self, table: Table, id: Uuid, fields: Row) -> Result<(), StoreError>;

    /// Like [`RecordStore::update`], but fails with [`StoreError::Conflict`]
    /// if the row's `updated_at` no longer equals `last_seen`.
    async fn update_if_unchanged(
        &self,
        table: Table,
        id: Uuid,
        fields: Row,
        last_seen: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Deleting a row that no longer exists succeeds.
    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError>;
}

/// A typed entity backed by one table.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;
    /// Lowercase noun used in notifications ("idea", "task").
    const NOUN: &'static str;
    /// Whether freshly created records go to the front of a list.
    const NEWEST_FIRST: bool = true;

    fn id(&self) -> Uuid;

    /// `None` for immutable records.
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn from_row(row: Row) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    fn to_row(&self) -> Result<Row, StoreError> {
        into_row(self)
    }
}

/// Serialize any struct into a row. Fields skipped by serde stay absent.
pub fn into_row<T: Serialize + ?Sized>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidValue {
            column: "<row>".into(),
            reason: format!("expected an object, got {other}"),
        }),
    }
}

pub async fn fetch_all<T: Record>(
    store: &dyn RecordStore,
    query: &Query,
) -> Result<Vec<T>, StoreError> {
    store
        .list(T::TABLE, query)
        .await?
        .into_iter()
        .map(T::from_row)
        .collect()
}

pub async fn fetch_one<T: Record>(
    store: &dyn RecordStore,
    id: Uuid,
) -> Result<Option<T>, StoreError> {
    store.get(T::TABLE, id).await?.map(T::from_row).transpose()
}
