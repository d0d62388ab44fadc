//! Student queries to the team's guide.

use crate::error::CoreError;

/// Answered queries retained per team; older answered ones are pruned when a
/// new query arrives. Unanswered queries are never pruned.
pub const ANSWERED_QUERIES_KEPT: i64 = 5;

pub fn validate_query_text(text: &str) -> Result<String, CoreError> {
    non_blank(text, "Query text must not be empty")
}

pub fn validate_reply(text: &str) -> Result<String, CoreError> {
    non_blank(text, "Reply content is required")
}

fn non_blank(text: &str, message: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}
