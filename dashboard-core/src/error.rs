use thiserror::Error;
use uuid::Uuid;

use crate::models::TaskStatus;
use crate::store::Table;

/// Input rejected before any store call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("ranking must be between 1 and 5, got {0}")]
    RankingOutOfRange(i64),
    #[error("comment must belong to an idea or a project")]
    MissingParent,
    #[error("comment cannot belong to both an idea and a project")]
    AmbiguousParent,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("{table} row {id} not found")]
    NotFound { table: Table, id: Uuid },
    #[error("{table} row {id} was modified since it was loaded")]
    Conflict { table: Table, id: Uuid },
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("{0} rows cannot be changed once created")]
    Immutable(Table),
    #[error("unknown column `{column}` on {table}")]
    UnknownColumn { table: Table, column: String },
    #[error("invalid value for `{column}`: {reason}")]
    InvalidValue { column: String, reason: String },
    #[error("malformed row: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid row: {0}")]
    Invalid(#[from] ValidationError),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("task cannot move from {} to {}", from.as_str(), to.as_str())]
    TransitionDenied { from: TaskStatus, to: TaskStatus },
}

/// Failure of a dashboard operation.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("{noun} {id} is not loaded")]
    NotLoaded { noun: &'static str, id: Uuid },
    #[error("no idea or project is open")]
    NothingOpen,
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
