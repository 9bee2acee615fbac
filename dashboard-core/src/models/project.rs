use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{optional, optional_patch, required, Ranking};
use crate::aggregate::{Kanban, StatusColumn};
use crate::error::ValidationError;
use crate::store::{Record, Table};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub ranking: Option<Ranking>,
    pub github_url: Option<String>,
    pub dashboard_url: Option<String>,
    pub plan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Project {
    const TABLE: Table = Table::Projects;
    const NOUN: &'static str = "project";

    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

impl Kanban for Project {
    type Status = ProjectStatus;

    fn status(&self) -> ProjectStatus {
        self.status
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Review,
    Complete,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        Self::Planning,
        Self::InProgress,
        Self::Review,
        Self::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(Self::Planning),
            "in-progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

impl StatusColumn for ProjectStatus {
    fn columns() -> &'static [Self] {
        &Self::ALL
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Complete => "Complete",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Ranking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl CreateProjectInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required(&self.name, "name")?,
            description: optional(self.description),
            github_url: optional(self.github_url),
            dashboard_url: optional(self.dashboard_url),
            plan: optional(self.plan),
            ..self
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Option<Ranking>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Option<String>>,
}

impl UpdateProjectInput {
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Plan editor save. Blank text clears the plan.
    pub fn plan(plan: Option<String>) -> Self {
        Self {
            plan: Some(plan),
            ..Default::default()
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self.name.map(|n| required(&n, "name")).transpose()?,
            description: optional_patch(self.description),
            github_url: optional_patch(self.github_url),
            dashboard_url: optional_patch(self.dashboard_url),
            plan: optional_patch(self.plan),
            ..self
        })
    }
}
