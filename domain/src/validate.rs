//! Lightweight input validation helpers. Keep logic minimal and deterministic.

use crate::CoreError;

/// Validate submitted todo text and return the trimmed slice.
///
/// Only rule: non-empty after trimming. No length cap, no character
/// restrictions, no duplicate check.
pub fn validate_todo_text(s: &str) -> Result<&str, CoreError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("text must not be empty".into()));
    }
    Ok(trimmed)
}
