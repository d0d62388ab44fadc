//! HTTP handlers, one module per resource area.

pub mod admin;
pub mod mentor_requests;
pub mod progress;
pub mod queries;
pub mod reviews;
pub mod students;
pub mod team_requests;
pub mod teams;
