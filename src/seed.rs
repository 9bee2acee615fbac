//! Sample data for a fresh dashboard.

use dashboard_core::models::{
    CreateIdeaInput, CreateProjectInput, IdeaStatus, Priority, ProjectStatus,
};
use dashboard_core::store::into_row;
use dashboard_core::{Database, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub projects: usize,
    pub ideas: usize,
}

fn project(name: &str, description: &str, status: ProjectStatus) -> CreateProjectInput {
    CreateProjectInput {
        description: Some(description.to_string()),
        status: Some(status),
        ..CreateProjectInput::new(name)
    }
}

fn idea(title: &str, description: &str, priority: Priority) -> CreateIdeaInput {
    CreateIdeaInput {
        description: Some(description.to_string()),
        status: Some(IdeaStatus::New),
        priority: Some(priority),
        source: Some("daily_brief".to_string()),
        ..CreateIdeaInput::new(title)
    }
}

/// Replace all ideas and projects with the sample set. Tasks, history, and
/// comments go with them.
pub fn seed(db: &Database) -> anyhow::Result<SeedSummary> {
    db.clear(Table::Ideas)?;
    db.clear(Table::Projects)?;

    let projects = [
        project(
            "Court Rulings Digest",
            "Weekly scrape of published tentative rulings with extracted summaries.",
            ProjectStatus::InProgress,
        ),
        project(
            "Sleep Dashboard",
            "Nightly sleep scores and heart-rate trends with a daily sync.",
            ProjectStatus::InProgress,
        ),
        project(
            "Partnership Dashboard",
            "Kanban dashboard for partnership ideas and project tracking.",
            ProjectStatus::Review,
        ),
        project(
            "Website Redesign",
            "Refresh of the public site with a simpler layout.",
            ProjectStatus::Planning,
        ),
    ];
    let ideas = [
        idea(
            "Document Summarization",
            "Summarize long filings and agreements ahead of case preparation.",
            Priority::High,
        ),
        idea(
            "Hearing Reminder Automation",
            "Alert a week before hearings so supplements can be filed in time.",
            Priority::High,
        ),
        idea(
            "Party and Counsel Lookup",
            "Pull party names and attorneys from the public case index.",
            Priority::Medium,
        ),
        idea(
            "Calendar Sync",
            "Keep hearing dates in the shared calendar without manual entry.",
            Priority::Medium,
        ),
        idea(
            "Sleep and Productivity",
            "Check whether sleep scores track with weekly output.",
            Priority::Low,
        ),
        idea(
            "Intake Form Automation",
            "Digital intake forms that create the matter record directly.",
            Priority::Medium,
        ),
    ];

    for input in &projects {
        db.insert_row(Table::Projects, into_row(input)?)?;
    }
    for input in &ideas {
        db.insert_row(Table::Ideas, into_row(input)?)?;
    }

    Ok(SeedSummary {
        projects: projects.len(),
        ideas: ideas.len(),
    })
}
