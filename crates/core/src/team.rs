//! Team composition rules.
//!
//! A team is a leader plus at most [`MAX_INVITEES`] accepted invitees. Two
//! students may only be on the same team when their project-type preference,
//! company (for external projects) and semester agree.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum members in a confirmed team, leader included.
pub const MAX_TEAM_SIZE: i64 = 4;

/// Maximum accepted invitees a leader may hold.
pub const MAX_INVITEES: i64 = MAX_TEAM_SIZE - 1;

pub const PROJECT_TYPE_INTERNAL: &str = "internal";
pub const PROJECT_TYPE_EXTERNAL: &str = "external";

/// Format a sequential team number as `TEAM-000N`.
pub fn format_team_id(number: i64) -> String {
    format!("TEAM-{number:04}")
}

/// Format a sequential project number as `P000N`.
pub fn format_project_id(number: i64) -> String {
    format!("P{number:04}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Internal,
    External,
}

impl ProjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::Internal => PROJECT_TYPE_INTERNAL,
            ProjectType::External => PROJECT_TYPE_EXTERNAL,
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_ascii_lowercase().as_str() {
            PROJECT_TYPE_INTERNAL => Ok(ProjectType::Internal),
            PROJECT_TYPE_EXTERNAL => Ok(ProjectType::External),
            other => Err(CoreError::Validation(format!(
                "Invalid project type '{other}'. Must be one of: internal, external"
            ))),
        }
    }
}

/// Validate a project-type preference update.
///
/// Returns the parsed type and the company name to store: trimmed and
/// required for external projects, cleared for internal ones.
pub fn validate_project_preference(
    project_type: &str,
    company_name: Option<&str>,
) -> Result<(ProjectType, Option<String>), CoreError> {
    let kind = ProjectType::parse(project_type)?;
    match kind {
        ProjectType::Internal => Ok((kind, None)),
        ProjectType::External => match company_name.map(str::trim) {
            Some(name) if !name.is_empty() => Ok((kind, Some(name.to_string()))),
            _ => Err(CoreError::Validation(
                "Company name is required for external projects".to_string(),
            )),
        },
    }
}

/// The slice of a student profile the composition guard looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub reg_num: String,
    pub semester: Option<i16>,
    pub project_type: Option<String>,
    pub company_name: Option<String>,
}

/// Check that two students may be placed on the same team.
pub fn check_compatibility(a: &MemberProfile, b: &MemberProfile) -> Result<(), CoreError> {
    let (a_type, b_type) = match (a.project_type.as_deref(), b.project_type.as_deref()) {
        (Some(x), Some(y)) => (ProjectType::parse(x)?, ProjectType::parse(y)?),
        _ => {
            return Err(CoreError::Validation(
                "Both students must set a project type before forming a team".to_string(),
            ))
        }
    };

    if a_type != b_type {
        return Err(CoreError::Validation(format!(
            "Project type mismatch: {} prefers {}, {} prefers {}",
            a.reg_num,
            a_type.as_str(),
            b.reg_num,
            b_type.as_str()
        )));
    }

    if a_type == ProjectType::External {
        let same_company = match (a.company_name.as_deref(), b.company_name.as_deref()) {
            (Some(x), Some(y)) => x.trim().eq_ignore_ascii_case(y.trim()),
            _ => false,
        };
        if !same_company {
            return Err(CoreError::Validation(
                "External project teams must share the same company".to_string(),
            ));
        }
    }

    if a.semester.is_none() || a.semester != b.semester {
        return Err(CoreError::Validation(format!(
            "Semester mismatch between {} and {}",
            a.reg_num, b.reg_num
        )));
    }

    Ok(())
}

/// Check that an inviter can take on one more accepted invitee.
pub fn check_invitee_slot(accepted_invitees: i64) -> Result<(), CoreError> {
    if accepted_invitees >= MAX_INVITEES {
        return Err(CoreError::Conflict(format!(
            "Team is full: a team may have at most {MAX_TEAM_SIZE} members"
        )));
    }
    Ok(())
}

/// Whether a leader with this many accepted invitees has a full team.
pub fn is_team_full(accepted_invitees: i64) -> bool {
    accepted_invitees >= MAX_INVITEES
}
