mod comment;
mod history;
mod idea;
mod project;
mod ranking;
mod task;

pub use comment::*;
pub use history::*;
pub use idea::*;
pub use project::*;
pub use ranking::*;
pub use task::*;

use crate::error::ValidationError;

/// Trim a required text field, rejecting blank input.
pub(crate) fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank input becomes `None`.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Same as [`optional`] for patch fields, where the outer `None` means
/// "leave unchanged" and `Some(None)` means "clear".
pub(crate) fn optional_patch(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(optional)
}
