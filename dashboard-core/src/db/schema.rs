pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT,
    status TEXT NOT NULL DEFAULT 'planning' CHECK (status IN ('planning', 'in-progress', 'review', 'complete')),
    ranking INTEGER CHECK (ranking BETWEEN 1 AND 5),
    github_url TEXT,
    dashboard_url TEXT,
    plan TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ideas (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT,
    status TEXT NOT NULL DEFAULT 'new' CHECK (status IN ('new', 'evaluating', 'approved', 'archived')),
    priority TEXT CHECK (priority IN ('low', 'medium', 'high')),
    ranking INTEGER CHECK (ranking BETWEEN 1 AND 5),
    source TEXT,
    project_id TEXT REFERENCES projects(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'in-progress', 'complete', 'cancelled')),
    due_date TEXT,
    completed_at TEXT,
    completion_notes TEXT,
    scheduler_job_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    -- completed_at is set exactly when the task is complete
    CHECK ((status = 'complete') = (completed_at IS NOT NULL))
);

CREATE TABLE IF NOT EXISTS project_history (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    entry_date TEXT NOT NULL,
    summary TEXT NOT NULL CHECK (length(trim(summary)) > 0),
    details TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL CHECK (length(trim(content)) > 0),
    author TEXT NOT NULL CHECK (length(trim(author)) > 0),
    idea_id TEXT REFERENCES ideas(id) ON DELETE CASCADE,
    project_id TEXT REFERENCES projects(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    -- exactly one parent
    CHECK ((idea_id IS NULL) <> (project_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_ideas_status ON ideas(status);
CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status);
CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
CREATE INDEX IF NOT EXISTS idx_history_project ON project_history(project_id);
CREATE INDEX IF NOT EXISTS idx_comments_idea ON comments(idea_id);
CREATE INDEX IF NOT EXISTS idx_comments_project ON comments(project_id);
"#;

/// Columns of each table, in declaration order.
pub(crate) fn columns(table: crate::store::Table) -> &'static [&'static str] {
    use crate::store::Table;

    match table {
        Table::Projects => &[
            "id",
            "name",
            "description",
            "status",
            "ranking",
            "github_url",
            "dashboard_url",
            "plan",
            "created_at",
            "updated_at",
        ],
        Table::Ideas => &[
            "id",
            "title",
            "description",
            "status",
            "priority",
            "ranking",
            "source",
            "project_id",
            "created_at",
            "updated_at",
        ],
        Table::Tasks => &[
            "id",
            "project_id",
            "title",
            "description",
            "status",
            "due_date",
            "completed_at",
            "completion_notes",
            "scheduler_job_id",
            "created_at",
            "updated_at",
        ],
        Table::ProjectHistory => &[
            "id",
            "project_id",
            "entry_date",
            "summary",
            "details",
            "created_at",
        ],
        Table::Comments => &[
            "id",
            "content",
            "author",
            "idea_id",
            "project_id",
            "created_at",
        ],
    }
}

/// Columns the store fills in itself and callers may not write.
pub(crate) const MANAGED_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];
