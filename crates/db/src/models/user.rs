//! Student and staff identity rows.

use capstone_core::team::MemberProfile;
use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub reg_num: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub dept: Option<String>,
    pub semester: Option<i16>,
    pub available: bool,
    pub project_type: Option<String>,
    pub company_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The fields the team composition guard compares.
    pub fn profile(&self) -> MemberProfile {
        MemberProfile {
            reg_num: self.reg_num.clone(),
            semester: self.semester,
            project_type: self.project_type.clone(),
            company_name: self.company_name.clone(),
        }
    }
}

/// DTO for provisioning a user. Identity is owned by an external provider;
/// this is used by seeding and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub reg_num: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub dept: Option<String>,
    pub semester: Option<i16>,
    pub project_type: Option<String>,
    pub company_name: Option<String>,
}

/// Request body for `PUT /profile/project-type`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProjectType {
    pub project_type: String,
    pub company_name: Option<String>,
}
