use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use dashboard_core::lifecycle::shows_completion_notes;
use dashboard_core::models::TaskStatus;
use dashboard_core::notify::Severity;
use dashboard_core::{Dashboard, Navigation};
use partnership_dashboard::api::{self, AppState};
use partnership_dashboard::config::{RemoteArgs, ServeArgs, StoreArgs};
use partnership_dashboard::seed;

#[derive(Parser)]
#[command(name = "pdash")]
#[command(about = "Kanban dashboard for partnership ideas and project tracking")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Board {
    Ideas,
    Projects,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server (the default)
    Serve(ServeArgs),
    /// Replace ideas and projects in the local database with sample data
    Seed,
    /// Log in to a running server and print the session token
    Login {
        password: String,

        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Print a kanban board
    Board {
        #[arg(value_enum)]
        board: Board,

        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Print a project's tasks in display order
    Tasks {
        project: Uuid,

        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Mark a task complete, or reopen it if it already is
    ToggleTask {
        task: Uuid,

        /// Project the task belongs to
        #[arg(long)]
        project: Uuid,

        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Comment on an idea or a project
    Comment {
        #[arg(value_enum)]
        on: Board,

        id: Uuid,

        #[arg(long)]
        author: String,

        #[arg(long)]
        content: String,

        #[command(flatten)]
        remote: RemoteArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "partnership_dashboard=debug,dashboard_core=info,tower_http=debug".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let command = match cli.command {
        Some(command) => command,
        None => Commands::Serve(ServeArgs::from_env()?),
    };

    match command {
        Commands::Serve(args) => serve(&cli.store, &args).await?,
        Commands::Seed => {
            let db = cli.store.open()?;
            let summary = seed::seed(&db)?;
            println!(
                "Seeded {} projects and {} ideas",
                summary.projects, summary.ideas
            );
        }
        Commands::Login { password, remote } => {
            let token = remote.store().login(&password).await?;
            println!("{token}");
        }
        Commands::Board { board, remote } => {
            let mut dashboard = connect(&remote);
            print_board(&mut dashboard, board).await?;
        }
        Commands::Tasks { project, remote } => {
            let mut dashboard = connect(&remote);
            if open_project(&mut dashboard, project).await? {
                print_tasks(&dashboard);
            }
        }
        Commands::ToggleTask {
            task,
            project,
            remote,
        } => {
            let mut dashboard = connect(&remote);
            if open_project(&mut dashboard, project).await? {
                let result = dashboard.toggle_task(task).await;
                print_notices(&mut dashboard);
                result?;
                print_tasks(&dashboard);
            }
        }
        Commands::Comment {
            on,
            id,
            author,
            content,
            remote,
        } => {
            let mut dashboard = connect(&remote);
            let navigation = match on {
                Board::Ideas => dashboard.open_idea(id).await?,
                Board::Projects => dashboard.open_project(id).await?,
            };
            if let Navigation::Redirect(_) = navigation {
                anyhow::bail!("{id} not found");
            }
            let result = dashboard.add_comment(&author, &content).await;
            print_notices(&mut dashboard);
            result?;
            println!("{} comments", dashboard.comments().len());
        }
    }

    Ok(())
}

async fn serve(store: &StoreArgs, args: &ServeArgs) -> anyhow::Result<()> {
    let ServeArgs { port, auth } = args;
    tracing::info!("Starting dashboard server on port {}", port);

    let db = store.open()?;
    let state = AppState {
        secure_cookies: auth.secure_cookies,
        ..AppState::new(db, auth.gate())
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Dashboard listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn connect(remote: &RemoteArgs) -> Dashboard {
    Dashboard::with_config(Arc::new(remote.store()), remote.dashboard_config())
}

async fn open_project(dashboard: &mut Dashboard, id: Uuid) -> anyhow::Result<bool> {
    match dashboard.open_project(id).await? {
        Navigation::Show(_) => Ok(true),
        Navigation::Redirect(_) => {
            eprintln!("Project {id} not found");
            Ok(false)
        }
    }
}

async fn print_board(dashboard: &mut Dashboard, board: Board) -> anyhow::Result<()> {
    match board {
        Board::Ideas => {
            dashboard.load_ideas().await?;
            let counts = dashboard.comment_counts();
            for column in dashboard.ideas_board() {
                println!("== {} ({})", column.label, column.len());
                for idea in column.items {
                    let mut line = format!("  {}  {}", idea.id, idea.title);
                    if let Some(priority) = idea.priority {
                        line.push_str(&format!("  [{}]", priority.as_str()));
                    }
                    if let Some(ranking) = idea.ranking {
                        line.push_str(&format!("  ({})", ranking.label()));
                    }
                    match counts.for_idea(idea.id) {
                        0 => {}
                        n => line.push_str(&format!("  {n} comments")),
                    }
                    println!("{line}");
                }
            }
        }
        Board::Projects => {
            dashboard.load_projects().await?;
            let counts = dashboard.comment_counts();
            for column in dashboard.projects_board() {
                println!("== {} ({})", column.label, column.len());
                for project in column.items {
                    let mut line = format!("  {}  {}", project.id, project.name);
                    if let Some(ranking) = project.ranking {
                        line.push_str(&format!("  ({})", ranking.label()));
                    }
                    match counts.for_project(project.id) {
                        0 => {}
                        n => line.push_str(&format!("  {n} comments")),
                    }
                    println!("{line}");
                }
            }
        }
    }
    Ok(())
}

fn print_tasks(dashboard: &Dashboard) {
    for task in dashboard.tasks_in_display_order() {
        let mark = if task.status == TaskStatus::Complete {
            "x"
        } else {
            " "
        };
        println!("[{mark}] {}  {}  ({})", task.id, task.title, task.status.as_str());
        if let Some(due) = task.due_date {
            println!("      due {}", due.format("%Y-%m-%d"));
        }
        if shows_completion_notes(task.status) {
            if let Some(notes) = &task.completion_notes {
                println!("      {notes}");
            }
        }
    }
}

fn print_notices(dashboard: &mut Dashboard) {
    for notice in dashboard.notices_mut().drain() {
        let description = notice.description.unwrap_or_default();
        match notice.severity {
            Severity::Success => println!("{} {}", notice.title, description),
            Severity::Error => eprintln!("{}: {}", notice.title, description),
        }
    }
}
