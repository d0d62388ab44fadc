//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument. Methods suffixed `_tx`
//! take an open transaction instead and never commit it.

pub mod deadline_repo;
pub mod marks_repo;
pub mod mentor_request_repo;
pub mod progress_repo;
pub mod project_repo;
pub mod query_repo;
pub mod review_request_repo;
pub mod scheduled_review_repo;
pub mod team_repo;
pub mod team_request_repo;
pub mod user_repo;

pub use deadline_repo::DeadlineRepo;
pub use marks_repo::MarksRepo;
pub use mentor_request_repo::MentorRequestRepo;
pub use progress_repo::{ProgressRepo, VerificationRepo};
pub use project_repo::ProjectRepo;
pub use query_repo::QueryRepo;
pub use review_request_repo::ReviewRequestRepo;
pub use scheduled_review_repo::ScheduledReviewRepo;
pub use team_repo::TeamRepo;
pub use team_request_repo::TeamRequestRepo;
pub use user_repo::UserRepo;
