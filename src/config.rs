//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::{Args, Command, FromArgMatches};

use dashboard_core::auth::{AuthGate, DEFAULT_SECRET};
use dashboard_core::{ConcurrencyPolicy, DashboardConfig, Database};

use crate::client::HttpStore;

/// Where the local SQLite database lives.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Database file [default: platform data directory]
    #[arg(long, env = "DASHBOARD_DB", global = true)]
    pub db: Option<PathBuf>,
}

impl StoreArgs {
    /// Open and migrate the database.
    pub fn open(&self) -> anyhow::Result<Database> {
        let db = match &self.db {
            Some(path) => Database::open(path)?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}

/// Settings for `pdash serve`, which is also what a bare `pdash` runs.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Port for HTTP API
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    #[command(flatten)]
    pub auth: AuthArgs,
}

impl ServeArgs {
    /// Server settings with no flags given, from the environment and defaults.
    pub fn from_env() -> Result<Self, clap::Error> {
        let matches = Self::augment_args(Command::new("serve")).try_get_matches_from(["serve"])?;
        Self::from_arg_matches(&matches)
    }
}

/// Password gate settings for the server.
#[derive(Debug, Clone, Args)]
pub struct AuthArgs {
    /// Shared dashboard password; when unset the dashboard is open
    #[arg(long, env = "APP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Secret mixed into session tokens
    #[arg(long, env = "AUTH_SECRET", default_value = DEFAULT_SECRET, hide_env_values = true)]
    pub auth_secret: String,

    /// Mark the session cookie Secure (serve behind HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,
}

impl AuthArgs {
    pub fn gate(&self) -> AuthGate {
        let gate = AuthGate::new(self.password.clone(), self.auth_secret.clone());
        if !gate.is_enabled() {
            tracing::warn!("APP_PASSWORD not set, the dashboard is open to everyone");
        }
        gate
    }
}

/// How client commands reach a running server.
#[derive(Debug, Clone, Args)]
pub struct RemoteArgs {
    /// Base URL of the dashboard server
    #[arg(long, env = "DASHBOARD_URL", default_value = "http://127.0.0.1:3000")]
    pub server: String,

    /// Session token from `pdash login`
    #[arg(long, env = "DASHBOARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Refuse to overwrite records changed by someone else since they were loaded
    #[arg(long)]
    pub reject_stale: bool,
}

impl RemoteArgs {
    pub fn store(&self) -> HttpStore {
        HttpStore::new(&self.server).with_token(self.token.clone())
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            concurrency: if self.reject_stale {
                ConcurrencyPolicy::RejectStale
            } else {
                ConcurrencyPolicy::LastWriteWins
            },
            ..Default::default()
        }
    }
}
