use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::required;
use crate::error::ValidationError;
use crate::store::{Record, Table};

/// What a comment is attached to. Exactly one parent, always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentParent {
    Idea(Uuid),
    Project(Uuid),
}

impl CommentParent {
    /// Build a parent from the two nullable reference columns.
    pub fn from_refs(
        idea_id: Option<Uuid>,
        project_id: Option<Uuid>,
    ) -> Result<Self, ValidationError> {
        match (idea_id, project_id) {
            (Some(id), None) => Ok(Self::Idea(id)),
            (None, Some(id)) => Ok(Self::Project(id)),
            (None, None) => Err(ValidationError::MissingParent),
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousParent),
        }
    }

    pub fn idea_id(&self) -> Option<Uuid> {
        match self {
            Self::Idea(id) => Some(*id),
            Self::Project(_) => None,
        }
    }

    pub fn project_id(&self) -> Option<Uuid> {
        match self {
            Self::Project(id) => Some(*id),
            Self::Idea(_) => None,
        }
    }

    /// Column to filter on when listing this parent's comments.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Idea(_) => "idea_id",
            Self::Project(_) => "project_id",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Idea(id) | Self::Project(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "CommentRow", into = "CommentRow")]
pub struct Comment {
    pub id: Uuid,
    pub parent: CommentParent,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Comment {
    const TABLE: Table = Table::Comments;
    const NOUN: &'static str = "comment";
    const NEWEST_FIRST: bool = false;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Stored shape of a comment: two nullable parent columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CommentRow {
    id: Uuid,
    #[serde(default)]
    idea_id: Option<Uuid>,
    #[serde(default)]
    project_id: Option<Uuid>,
    author: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = ValidationError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            parent: CommentParent::from_refs(row.idea_id, row.project_id)?,
            author: row.author,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

impl From<Comment> for CommentRow {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            idea_id: comment.parent.idea_id(),
            project_id: comment.parent.project_id(),
            author: comment.author,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(into = "NewCommentRow")]
pub struct CreateCommentInput {
    pub parent: CommentParent,
    pub author: String,
    pub content: String,
}

#[derive(Serialize)]
struct NewCommentRow {
    idea_id: Option<Uuid>,
    project_id: Option<Uuid>,
    author: String,
    content: String,
}

impl From<CreateCommentInput> for NewCommentRow {
    fn from(input: CreateCommentInput) -> Self {
        Self {
            idea_id: input.parent.idea_id(),
            project_id: input.parent.project_id(),
            author: input.author,
            content: input.content,
        }
    }
}

impl CreateCommentInput {
    pub fn new(
        parent: CommentParent,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            parent,
            author: author.into(),
            content: content.into(),
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            author: required(&self.author, "author")?,
            content: required(&self.content, "content")?,
            ..self
        })
    }
}
