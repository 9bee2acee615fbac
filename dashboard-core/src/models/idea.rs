use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{optional, optional_patch, required, Ranking};
use crate::aggregate::{Kanban, StatusColumn};
use crate::error::ValidationError;
use crate::store::{Record, Table};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Idea {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: IdeaStatus,
    pub priority: Option<Priority>,
    pub ranking: Option<Ranking>,
    pub source: Option<String>,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Idea {
    const TABLE: Table = Table::Ideas;
    const NOUN: &'static str = "idea";

    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

impl Kanban for Idea {
    type Status = IdeaStatus;

    fn status(&self) -> IdeaStatus {
        self.status
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum IdeaStatus {
    New,
    Evaluating,
    Approved,
    Archived,
}

impl IdeaStatus {
    pub const ALL: [IdeaStatus; 4] = [
        Self::New,
        Self::Evaluating,
        Self::Approved,
        Self::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Evaluating => "evaluating",
            Self::Approved => "approved",
            Self::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "evaluating" => Some(Self::Evaluating),
            "approved" => Some(Self::Approved),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl StatusColumn for IdeaStatus {
    fn columns() -> &'static [Self] {
        &Self::ALL
    }

    fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Evaluating => "Evaluating",
            Self::Approved => "Approved",
            Self::Archived => "Archived",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateIdeaInput {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IdeaStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Ranking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
}

impl CreateIdeaInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required(&self.title, "title")?,
            description: optional(self.description),
            source: optional(self.source),
            ..self
        })
    }
}

/// Partial update. An outer `None` leaves the field unchanged; `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIdeaInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IdeaStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Option<Priority>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Option<Ranking>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<Uuid>>,
}

impl UpdateIdeaInput {
    pub fn status(status: IdeaStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: self.title.map(|t| required(&t, "title")).transpose()?,
            description: optional_patch(self.description),
            source: optional_patch(self.source),
            ..self
        })
    }
}
