use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dashboard_core::{Query, Row, StoreError, Table};

use super::{ApiError, AppState};

/// Body of `PATCH /api/records/{table}/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub fields: Row,
    /// When present, the update only applies if the row is unchanged since.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

fn table(name: &str) -> Result<Table, ApiError> {
    Table::from_str(name).ok_or_else(|| ApiError::UnknownTable(name.to_string()))
}

pub async fn search(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(query): Json<Query>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let rows = state.db.list_rows(table(&name)?, &query)?;
    Ok(Json(rows))
}

pub async fn insert(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(fields): Json<Row>,
) -> Result<(StatusCode, Json<Row>), ApiError> {
    let row = state.db.insert_row(table(&name)?, fields)?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn get(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, Uuid)>,
) -> Result<Json<Row>, ApiError> {
    let table = table(&name)?;
    state
        .db
        .get_row(table, id)?
        .map(Json)
        .ok_or(ApiError::Store(StoreError::NotFound { table, id }))
}

pub async fn update(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .update_row(table(&name)?, id, req.fields, req.last_seen)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_row(table(&name)?, id)?;
    Ok(StatusCode::NO_CONTENT)
}
