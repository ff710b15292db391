//! Common utilities and helper functions

pub mod error;
pub mod retry;

/// Trimmed copy of a form field, or `None` when nothing but whitespace remains
pub fn non_empty_trimmed(field: &str) -> Option<String> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
