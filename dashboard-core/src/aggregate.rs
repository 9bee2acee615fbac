//! Views derived from full scans of cached records.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{Comment, CommentParent};
use crate::store::Record;

/// A closed status enumeration that doubles as a set of kanban columns.
pub trait StatusColumn: Copy + Eq + 'static {
    /// Every status, in column order.
    fn columns() -> &'static [Self];

    fn label(&self) -> &'static str;
}

/// A record shown on a kanban board.
pub trait Kanban: Record {
    type Status: StatusColumn;

    fn status(&self) -> Self::Status;
}

#[derive(Debug)]
pub struct Column<'a, T: Kanban> {
    pub status: T::Status,
    pub label: &'static str,
    pub items: Vec<&'a T>,
}

impl<T: Kanban> Column<'_, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Group records into one column per status. Records keep their relative
/// order inside a column.
pub fn columns<T: Kanban>(items: &[T]) -> Vec<Column<'_, T>> {
    T::Status::columns()
        .iter()
        .map(|&status| Column {
            status,
            label: status.label(),
            items: items.iter().filter(|item| item.status() == status).collect(),
        })
        .collect()
}

/// Comment totals per idea and per project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentCounts {
    ideas: HashMap<Uuid, usize>,
    projects: HashMap<Uuid, usize>,
}

impl CommentCounts {
    pub fn from_comments<'a>(comments: impl IntoIterator<Item = &'a Comment>) -> Self {
        let mut counts = Self::default();
        for comment in comments {
            counts.bump(comment.parent);
        }
        counts
    }

    pub fn get(&self, parent: CommentParent) -> usize {
        let map = match parent {
            CommentParent::Idea(_) => &self.ideas,
            CommentParent::Project(_) => &self.projects,
        };
        map.get(&parent.id()).copied().unwrap_or(0)
    }

    pub fn for_idea(&self, id: Uuid) -> usize {
        self.get(CommentParent::Idea(id))
    }

    pub fn for_project(&self, id: Uuid) -> usize {
        self.get(CommentParent::Project(id))
    }

    /// Count one more comment on `parent`. There is no decrement: comments
    /// are never deleted.
    pub fn bump(&mut self, parent: CommentParent) {
        let map = match parent {
            CommentParent::Idea(_) => &mut self.ideas,
            CommentParent::Project(_) => &mut self.projects,
        };
        *map.entry(parent.id()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.ideas.values().sum::<usize>() + self.projects.values().sum::<usize>()
    }
}
