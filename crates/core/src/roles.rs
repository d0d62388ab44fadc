//! Well-known role names.
//!
//! User roles must match the `CHECK` constraint on `users.role`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_ADMIN: &str = "admin";

/// The two mentorship roles a staff member can hold for a team.
///
/// Guide and expert requests share one table and one lifecycle; this enum is
/// the discriminant stored in `mentor_requests.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentorRole {
    Guide,
    Expert,
}

impl MentorRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MentorRole::Guide => "guide",
            MentorRole::Expert => "expert",
        }
    }

    /// Parse a path segment such as `guide` or `expert`.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.to_ascii_lowercase().as_str() {
            "guide" => Ok(MentorRole::Guide),
            "expert" | "sub_expert" => Ok(MentorRole::Expert),
            other => Err(CoreError::Validation(format!(
                "Invalid mentor role '{other}'. Must be one of: guide, expert"
            ))),
        }
    }

    /// The other mentorship role.
    pub fn counterpart(self) -> Self {
        match self {
            MentorRole::Guide => MentorRole::Expert,
            MentorRole::Expert => MentorRole::Guide,
        }
    }

    /// Human-readable label used in notifications.
    pub fn label(self) -> &'static str {
        match self {
            MentorRole::Guide => "Guide",
            MentorRole::Expert => "Subject Expert",
        }
    }
}

impl std::fmt::Display for MentorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
