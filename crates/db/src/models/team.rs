//! Confirmed teams and their members.

use capstone_core::roles::MentorRole;
use capstone_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::project::Project;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub team_id: String,
    pub semester: i16,
    pub guide_reg_num: Option<String>,
    pub expert_reg_num: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Team {
    /// The staff member assigned to `role`, if any.
    pub fn mentor(&self, role: MentorRole) -> Option<&str> {
        match role {
            MentorRole::Guide => self.guide_reg_num.as_deref(),
            MentorRole::Expert => self.expert_reg_num.as_deref(),
        }
    }

    /// The role `reg_num` holds for this team, if any.
    pub fn role_of(&self, reg_num: &str) -> Option<MentorRole> {
        if self.guide_reg_num.as_deref() == Some(reg_num) {
            Some(MentorRole::Guide)
        } else if self.expert_reg_num.as_deref() == Some(reg_num) {
            Some(MentorRole::Expert)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMember {
    pub id: DbId,
    pub team_id: String,
    pub reg_num: String,
    pub is_leader: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A team with its members and project, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct TeamDetails {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMember>,
    pub project: Option<Project>,
}

impl TeamDetails {
    pub fn leader(&self) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.is_leader)
    }
}
