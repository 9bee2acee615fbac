//! Task status rules.
//!
//! Any status may follow any other unless a [`TransitionPolicy`] says
//! otherwise. What a transition does to `completed_at` is fixed: it is stamped
//! on entering `complete` and cleared on leaving it, so a task has a
//! completion time exactly when it is complete.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{DashboardError, LifecycleError, ValidationError};
use crate::models::{CreateTaskInput, Task, TaskForm, TaskStatus, UpdateTaskInput};

/// Which status changes the edit form may make.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionPolicy {
    denied: HashSet<(TaskStatus, TaskStatus)>,
}

impl TransitionPolicy {
    /// Every status reachable from every other.
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn deny(mut self, from: TaskStatus, to: TaskStatus) -> Self {
        self.denied.insert((from, to));
        self
    }

    /// Staying in the same status is always allowed.
    pub fn allows(&self, from: TaskStatus, to: TaskStatus) -> bool {
        from == to || !self.denied.contains(&(from, to))
    }

    pub fn check(&self, from: TaskStatus, to: TaskStatus) -> Result<(), LifecycleError> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(LifecycleError::TransitionDenied { from, to })
        }
    }
}

/// Effect of a status change on `completed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletedAt {
    Stamp(DateTime<Utc>),
    Clear,
    Keep,
}

impl CompletedAt {
    pub fn for_transition(from: Option<TaskStatus>, to: TaskStatus, now: DateTime<Utc>) -> Self {
        match (from, to) {
            (Some(TaskStatus::Complete), TaskStatus::Complete) => Self::Keep,
            (_, TaskStatus::Complete) => Self::Stamp(now),
            _ => Self::Clear,
        }
    }

    /// As a patch field: `None` leaves the column alone.
    pub fn as_patch(self) -> Option<Option<DateTime<Utc>>> {
        match self {
            Self::Stamp(at) => Some(Some(at)),
            Self::Clear => Some(None),
            Self::Keep => None,
        }
    }
}

/// Patch moving `task` to `to`.
pub fn transition(
    task: &Task,
    to: TaskStatus,
    now: DateTime<Utc>,
    policy: &TransitionPolicy,
) -> Result<UpdateTaskInput, LifecycleError> {
    policy.check(task.status, to)?;
    Ok(UpdateTaskInput {
        status: Some(to),
        completed_at: CompletedAt::for_transition(Some(task.status), to, now).as_patch(),
        ..Default::default()
    })
}

/// Fast-path checkbox: complete tasks reopen as pending, anything else
/// becomes complete. Not subject to the transition policy.
pub fn toggle_complete(task: &Task, now: DateTime<Utc>) -> UpdateTaskInput {
    let to = if task.status == TaskStatus::Complete {
        TaskStatus::Pending
    } else {
        TaskStatus::Complete
    };
    UpdateTaskInput {
        status: Some(to),
        completed_at: CompletedAt::for_transition(Some(task.status), to, now).as_patch(),
        ..Default::default()
    }
}

/// Patch for a saved edit form.
pub fn edit(
    task: &Task,
    form: TaskForm,
    now: DateTime<Utc>,
    policy: &TransitionPolicy,
) -> Result<UpdateTaskInput, DashboardError> {
    policy.check(task.status, form.status)?;
    let to = form.status;
    let mut patch = form.into_patch()?;
    patch.completed_at = CompletedAt::for_transition(Some(task.status), to, now).as_patch();
    Ok(patch)
}

/// Validate a new task and stamp `completed_at` if it starts out complete.
pub fn prepare_create(
    input: CreateTaskInput,
    now: DateTime<Utc>,
) -> Result<CreateTaskInput, ValidationError> {
    let mut input = input.normalize()?;
    let status = input.status.unwrap_or(TaskStatus::Pending);
    input.completed_at = match CompletedAt::for_transition(None, status, now) {
        CompletedAt::Stamp(at) => Some(at),
        _ => None,
    };
    Ok(input)
}

/// Position of a status in the task list.
pub fn display_rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::InProgress => 0,
        TaskStatus::Pending => 1,
        TaskStatus::Complete => 2,
        TaskStatus::Cancelled => 3,
    }
}

/// Stable sort: tasks with the same status keep their relative order.
pub fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| display_rank(t.status));
}

pub fn in_display_order(tasks: &[Task]) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by_key(|t| display_rank(t.status));
    ordered
}

/// Completion notes are only shown for finished tasks.
pub fn shows_completion_notes(status: TaskStatus) -> bool {
    matches!(status, TaskStatus::Complete | TaskStatus::Cancelled)
}
