use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{optional, required};
use crate::error::ValidationError;
use crate::store::{Record, Table};

/// An append-only log entry on a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectHistory {
    pub id: Uuid,
    pub project_id: Uuid,
    pub entry_date: DateTime<Utc>,
    pub summary: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for ProjectHistory {
    const TABLE: Table = Table::ProjectHistory;
    const NOUN: &'static str = "history entry";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHistoryInput {
    pub project_id: Uuid,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Defaults to the insert time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<DateTime<Utc>>,
}

impl CreateHistoryInput {
    pub fn new(project_id: Uuid, summary: impl Into<String>) -> Self {
        Self {
            project_id,
            summary: summary.into(),
            details: None,
            entry_date: None,
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            summary: required(&self.summary, "summary")?,
            details: optional(self.details),
            ..self
        })
    }
}
