//! HTTP API: the record store over JSON, plus login and setup endpoints.

mod auth;
mod error;
mod records;

pub use error::ApiError;
pub use records::UpdateRequest;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use dashboard_core::auth::AuthGate;
use dashboard_core::Database;

use crate::seed;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub gate: AuthGate,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(db: Database, gate: AuthGate) -> Self {
        Self {
            db,
            gate,
            secure_cookies: false,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let records = Router::new()
        .route("/{table}", post(records::insert))
        .route("/{table}/search", post(records::search))
        .route(
            "/{table}/{id}",
            get(records::get)
                .patch(records::update)
                .delete(records::delete),
        );

    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth", post(auth::login))
        .route("/api/setup", post(setup))
        .nest("/api/records", records)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    pub action: String,
}

async fn setup(
    State(state): State<AppState>,
    Json(req): Json<SetupRequest>,
) -> Result<Json<Value>, ApiError> {
    match req.action.as_str() {
        "migrate" => {
            state.db.migrate()?;
            Ok(Json(json!({ "success": true, "message": "Schema is up to date" })))
        }
        "seed-data" => {
            let summary = seed::seed(&state.db)?;
            tracing::info!(
                projects = summary.projects,
                ideas = summary.ideas,
                "seeded database"
            );
            Ok(Json(json!({ "success": true, "message": "Data seeded successfully" })))
        }
        other => Err(ApiError::BadRequest(format!("Unknown action: {other}"))),
    }
}
