//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` input DTOs for inserts and updates

pub mod mentor_request;
pub mod progress;
pub mod project;
pub mod query;
pub mod review;
pub mod team;
pub mod team_request;
pub mod user;
