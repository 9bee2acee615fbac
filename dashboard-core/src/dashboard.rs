//! One user's view of the dashboard.
//!
//! [`Dashboard`] owns the cached boards and the open detail view, and routes
//! every mutation through the optimistic [`Protocol`]. It does no rendering:
//! callers read the caches and notices and draw them however they like.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::aggregate::{columns, Column, CommentCounts};
use crate::cache::{EntityCache, Reconciled};
use crate::error::{DashboardError, Result, StoreError};
use crate::lifecycle::{self, TransitionPolicy};
use crate::models::*;
use crate::mutation::{ConcurrencyPolicy, Protocol, Titles};
use crate::notify::Notifications;
use crate::store::{fetch_all, fetch_one, Query, RecordStore, Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ideas,
    Projects,
    Idea(Uuid),
    Project(Uuid),
}

/// Outcome of opening a detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Show(Route),
    /// The record is gone; go back to its list.
    Redirect(Route),
}

#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    pub concurrency: ConcurrencyPolicy,
    pub transitions: TransitionPolicy,
}

pub struct Dashboard {
    store: Arc<dyn RecordStore>,
    config: DashboardConfig,
    notices: Notifications,
    ideas: EntityCache<Idea>,
    projects: EntityCache<Project>,
    tasks: EntityCache<Task>,
    history: EntityCache<ProjectHistory>,
    comments: EntityCache<Comment>,
    comment_counts: CommentCounts,
    open: Option<CommentParent>,
}

impl Dashboard {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_config(store, DashboardConfig::default())
    }

    pub fn with_config(store: Arc<dyn RecordStore>, config: DashboardConfig) -> Self {
        Self {
            store,
            config,
            notices: Notifications::new(),
            ideas: EntityCache::new(),
            projects: EntityCache::new(),
            tasks: EntityCache::new(),
            history: EntityCache::new(),
            comments: EntityCache::new(),
            comment_counts: CommentCounts::default(),
            open: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn ideas(&self) -> &[Idea] {
        self.ideas.items()
    }

    pub fn projects(&self) -> &[Project] {
        self.projects.items()
    }

    pub fn selected_idea(&self) -> Option<&Idea> {
        self.ideas.selected()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects.selected()
    }

    /// Tasks of the open project, in stored order.
    pub fn tasks(&self) -> &[Task] {
        self.tasks.items()
    }

    pub fn tasks_in_display_order(&self) -> Vec<&Task> {
        lifecycle::in_display_order(self.tasks.items())
    }

    /// History of the open project, newest entry first.
    pub fn history(&self) -> Vec<&ProjectHistory> {
        let mut entries: Vec<&ProjectHistory> = self.history.items().iter().collect();
        entries.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
        entries
    }

    /// Comments on the open idea or project, oldest first.
    pub fn comments(&self) -> &[Comment] {
        self.comments.items()
    }

    pub fn comment_counts(&self) -> &CommentCounts {
        &self.comment_counts
    }

    pub fn open_parent(&self) -> Option<CommentParent> {
        self.open
    }

    pub fn notices(&self) -> &Notifications {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notifications {
        &mut self.notices
    }

    pub fn ideas_board(&self) -> Vec<Column<'_, Idea>> {
        columns(self.ideas.items())
    }

    pub fn projects_board(&self) -> Vec<Column<'_, Project>> {
        columns(self.projects.items())
    }

    // --- loading -------------------------------------------------------

    pub async fn load_ideas(&mut self) -> Result<()> {
        let ideas = fetch_all::<Idea>(self.store.as_ref(), &Query::newest_first())
            .await
            .inspect_err(|e| tracing::error!("Error fetching ideas: {}", e))?;
        self.ideas.load(ideas);
        self.load_comment_counts().await
    }

    pub async fn load_projects(&mut self) -> Result<()> {
        let projects = fetch_all::<Project>(self.store.as_ref(), &Query::newest_first())
            .await
            .inspect_err(|e| tracing::error!("Error fetching projects: {}", e))?;
        self.projects.load(projects);
        self.load_comment_counts().await
    }

    /// Recount comments from a full scan.
    pub async fn load_comment_counts(&mut self) -> Result<()> {
        let all = fetch_all::<Comment>(self.store.as_ref(), &Query::new()).await?;
        self.comment_counts = CommentCounts::from_comments(&all);
        Ok(())
    }

    pub async fn open_idea(&mut self, id: Uuid) -> Result<Navigation> {
        let Some(idea) = fetch_one::<Idea>(self.store.as_ref(), id).await? else {
            tracing::debug!(%id, "idea not found, back to the board");
            return Ok(Navigation::Redirect(Route::Ideas));
        };
        self.close();
        self.ideas.select(idea);
        self.open = Some(CommentParent::Idea(id));
        self.load_comments().await?;
        Ok(Navigation::Show(Route::Idea(id)))
    }

    pub async fn open_project(&mut self, id: Uuid) -> Result<Navigation> {
        let Some(project) = fetch_one::<Project>(self.store.as_ref(), id).await? else {
            tracing::debug!(%id, "project not found, back to the board");
            return Ok(Navigation::Redirect(Route::Projects));
        };
        self.close();
        self.projects.select(project);
        self.open = Some(CommentParent::Project(id));

        let by_project = Query::oldest_first().eq("project_id", id.to_string());
        let tasks = fetch_all::<Task>(self.store.as_ref(), &by_project).await?;
        let history = fetch_all::<ProjectHistory>(self.store.as_ref(), &by_project).await?;
        self.tasks.load(tasks);
        self.history.load(history);
        self.load_comments().await?;
        Ok(Navigation::Show(Route::Project(id)))
    }

    /// Close the detail view.
    pub fn close(&mut self) {
        self.ideas.close();
        self.projects.close();
        self.tasks.load(Vec::new());
        self.history.load(Vec::new());
        self.comments.load(Vec::new());
        self.open = None;
    }

    async fn load_comments(&mut self) -> Result<()> {
        let Some(parent) = self.open else {
            return Ok(());
        };
        let query = Query::oldest_first().eq(parent.column(), parent.id().to_string());
        let comments = fetch_all::<Comment>(self.store.as_ref(), &query).await?;
        self.comments.load(comments);
        Ok(())
    }

    /// Take a row from the store as the current truth for whichever cache
    /// holds its table.
    pub fn reconcile(&mut self, table: Table, row: Row) -> Result<Reconciled, StoreError> {
        match table {
            Table::Ideas => self.ideas.reconcile(row),
            Table::Projects => self.projects.reconcile(row),
            Table::Tasks => self.tasks.reconcile(row),
            Table::ProjectHistory => self.history.reconcile(row),
            Table::Comments => self.comments.reconcile(row),
        }
    }

    // --- ideas ---------------------------------------------------------

    pub async fn create_idea(&mut self, input: CreateIdeaInput) -> Result<Idea> {
        let input = input.normalize()?;
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .create(&mut self.ideas, &input, Titles::created::<Idea>())
            .await
    }

    pub async fn update_idea(&mut self, id: Uuid, patch: UpdateIdeaInput) -> Result<Idea> {
        let patch = patch.normalize()?;
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .update(&mut self.ideas, id, &patch)
            .await
    }

    /// Move an idea to another column.
    pub async fn set_idea_status(&mut self, id: Uuid, status: IdeaStatus) -> Result<Idea> {
        self.update_idea(id, UpdateIdeaInput::status(status)).await
    }

    pub async fn delete_idea(&mut self, id: Uuid) -> Result<()> {
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .delete(&mut self.ideas, id)
            .await?;
        if self.open == Some(CommentParent::Idea(id)) {
            self.close();
        }
        Ok(())
    }

    // --- projects ------------------------------------------------------

    pub async fn create_project(&mut self, input: CreateProjectInput) -> Result<Project> {
        let input = input.normalize()?;
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .create(&mut self.projects, &input, Titles::created::<Project>())
            .await
    }

    pub async fn update_project(&mut self, id: Uuid, patch: UpdateProjectInput) -> Result<Project> {
        let patch = patch.normalize()?;
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .update(&mut self.projects, id, &patch)
            .await
    }

    pub async fn set_project_status(&mut self, id: Uuid, status: ProjectStatus) -> Result<Project> {
        self.update_project(id, UpdateProjectInput::status(status)).await
    }

    /// Save the free-text plan. Blank text removes it.
    pub async fn save_plan(&mut self, id: Uuid, plan: Option<String>) -> Result<Project> {
        let patch = UpdateProjectInput::plan(plan).normalize()?;
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .update_titled(
                &mut self.projects,
                id,
                &patch,
                Titles::new("Plan updated", "Error saving plan"),
            )
            .await
    }

    pub async fn delete_project(&mut self, id: Uuid) -> Result<()> {
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .delete(&mut self.projects, id)
            .await?;
        if self.is_open_project(id) {
            self.close();
        }
        Ok(())
    }

    // --- tasks ---------------------------------------------------------

    pub async fn create_task(&mut self, input: CreateTaskInput) -> Result<Task> {
        let input = lifecycle::prepare_create(input, Utc::now())?;
        let task: Task =
            Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
                .insert(&input, Titles::created::<Task>())
                .await?;
        if self.is_open_project(task.project_id) {
            self.tasks.add(task.clone());
        }
        Ok(task)
    }

    /// Tasks and history are only cached for the open project.
    fn is_open_project(&self, id: Uuid) -> bool {
        self.open == Some(CommentParent::Project(id))
    }

    fn task(&self, id: Uuid) -> Result<&Task> {
        self.tasks
            .get(id)
            .ok_or(DashboardError::NotLoaded { noun: "task", id })
    }

    /// Save the task edit form.
    pub async fn edit_task(&mut self, id: Uuid, form: TaskForm) -> Result<Task> {
        let patch = lifecycle::edit(self.task(id)?, form, Utc::now(), &self.config.transitions)?;
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .update(&mut self.tasks, id, &patch)
            .await
    }

    pub async fn set_task_status(&mut self, id: Uuid, status: TaskStatus) -> Result<Task> {
        let patch = lifecycle::transition(
            self.task(id)?,
            status,
            Utc::now(),
            &self.config.transitions,
        )?;
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .update(&mut self.tasks, id, &patch)
            .await
    }

    /// Checkbox toggle between complete and pending.
    pub async fn toggle_task(&mut self, id: Uuid) -> Result<Task> {
        let task = self.task(id)?;
        let patch = lifecycle::toggle_complete(task, Utc::now());
        let success = if patch.status == Some(TaskStatus::Complete) {
            "Task completed"
        } else {
            "Task reopened"
        };
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .update_titled(
                &mut self.tasks,
                id,
                &patch,
                Titles::new(success, "Error updating task"),
            )
            .await
    }

    pub async fn delete_task(&mut self, id: Uuid) -> Result<()> {
        Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .delete(&mut self.tasks, id)
            .await
    }

    // --- history and comments -----------------------------------------

    pub async fn add_history(&mut self, input: CreateHistoryInput) -> Result<ProjectHistory> {
        let input = input.normalize()?;
        let entry: ProjectHistory =
            Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
                .insert(&input, Titles::new("History entry added", "Error adding entry"))
                .await?;
        if self.is_open_project(entry.project_id) {
            self.history.add(entry.clone());
        }
        Ok(entry)
    }

    /// Comment on the open idea or project.
    pub async fn add_comment(&mut self, author: &str, content: &str) -> Result<Comment> {
        let parent = self.open.ok_or(DashboardError::NothingOpen)?;
        let input = CreateCommentInput::new(parent, author, content).normalize()?;
        let comment = Protocol::new(self.store.as_ref(), &mut self.notices, self.config.concurrency)
            .create(
                &mut self.comments,
                &input,
                Titles::new("Comment added", "Error adding comment"),
            )
            .await?;
        self.comment_counts.bump(parent);
        Ok(comment)
    }
}
