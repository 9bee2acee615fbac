use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use dashboard_core::auth::AuthError;
use dashboard_core::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown table `{0}`")]
    UnknownTable(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownTable(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::InvalidPassword) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::NotConfigured) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(err) => match err {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::Conflict { .. } => StatusCode::CONFLICT,
                StoreError::Immutable(_)
                | StoreError::UnknownColumn { .. }
                | StoreError::InvalidValue { .. }
                | StoreError::Constraint(_)
                | StoreError::Invalid(_)
                | StoreError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
                StoreError::Database(_)
                | StoreError::Poisoned
                | StoreError::Transport(_)
                | StoreError::Rejected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
