//! User-visible notifications ("toasts").

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
}

/// Notification log for one session, oldest first.
#[derive(Debug, Default)]
pub struct Notifications {
    entries: Vec<Notice>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, title: impl Into<String>, description: Option<String>) {
        let title = title.into();
        tracing::info!(description = description.as_deref(), "{}", title);
        self.entries.push(Notice {
            title,
            description,
            severity: Severity::Success,
        });
    }

    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        let title = title.into();
        let message = message.into();
        tracing::warn!(error = %message, "{}", title);
        self.entries.push(Notice {
            title,
            description: Some(message),
            severity: Severity::Error,
        });
    }

    pub fn entries(&self) -> &[Notice] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Notice> {
        self.entries.last()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notice> {
        self.entries
            .iter()
            .filter(|n| n.severity == Severity::Error)
    }

    /// Hand the pending notices to the presentation layer.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.entries)
    }
}
