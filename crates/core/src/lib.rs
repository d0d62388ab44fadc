//! Domain rules for the capstone project workflow.
//!
//! This crate has no internal dependencies so the rules can be shared by the
//! repository layer, the request lifecycle engine and any tooling.

pub mod capacity;
pub mod error;
pub mod progress;
pub mod query;
pub mod request_status;
pub mod review;
pub mod roles;
pub mod team;
pub mod types;
