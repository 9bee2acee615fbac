//! Record store that talks to a running dashboard server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use dashboard_core::{Query, RecordStore, Row, StoreError, Table};

use crate::api::UpdateRequest;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Exchange the dashboard password for a session token.
    pub async fn login(&self, password: &str) -> Result<String, StoreError> {
        let response = self
            .client
            .post(format!("{}/api/auth", self.base_url))
            .json(&json!({ "password": password }))
            .send()
            .await
            .map_err(transport)?;
        let response = check(response, None).await?;
        let body: LoginResponse = response.json().await.map_err(transport)?;
        Ok(body.token)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/records/{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn patch(&self, table: Table, id: Uuid, body: UpdateRequest) -> Result<(), StoreError> {
        let response = self
            .request(Method::PATCH, &format!("{table}/{id}"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        check(response, Some((table, id))).await?;
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

/// Turn an error response into the matching store error.
async fn check(response: Response, target: Option<(Table, Uuid)>) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    Err(match (status, target) {
        (StatusCode::NOT_FOUND, Some((table, id))) => StoreError::NotFound { table, id },
        (StatusCode::CONFLICT, Some((table, id))) => StoreError::Conflict { table, id },
        _ => StoreError::Rejected(message),
    })
}

#[async_trait]
impl RecordStore for HttpStore {
    async fn list(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        let response = self
            .request(Method::POST, &format!("{table}/search"))
            .json(query)
            .send()
            .await
            .map_err(transport)?;
        let response = check(response, None).await?;
        response.json().await.map_err(transport)
    }

    async fn get(&self, table: Table, id: Uuid) -> Result<Option<Row>, StoreError> {
        let response = self
            .request(Method::GET, &format!("{table}/{id}"))
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check(response, Some((table, id))).await?;
        response.json().await.map(Some).map_err(transport)
    }

    async fn insert(&self, table: Table, fields: Row) -> Result<Row, StoreError> {
        let response = self
            .request(Method::POST, table.as_str())
            .json(&fields)
            .send()
            .await
            .map_err(transport)?;
        let response = check(response, None).await?;
        response.json().await.map_err(transport)
    }

    async fn update(&self, table: Table, id: Uuid, fields: Row) -> Result<(), StoreError> {
        self.patch(
            table,
            id,
            UpdateRequest {
                fields,
                last_seen: None,
            },
        )
        .await
    }

    async fn update_if_unchanged(
        &self,
        table: Table,
        id: Uuid,
        fields: Row,
        last_seen: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.patch(
            table,
            id,
            UpdateRequest {
                fields,
                last_seen: Some(last_seen),
            },
        )
        .await
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE, &format!("{table}/{id}"))
            .send()
            .await
            .map_err(transport)?;
        check(response, Some((table, id))).await?;
        Ok(())
    }
}
