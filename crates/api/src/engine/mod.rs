//! The request lifecycle engine and the workflows built on it.
//!
//! [`lifecycle`] holds the shared shape of every single-acceptor request
//! (create, fan out, decide inside one transaction, clean up). The other
//! modules instantiate it or build the two-phase and progress workflows that
//! share its conventions: validation before mutation, one transaction per
//! decision, notifications only after commit.

pub mod lifecycle;
pub mod mentor;
pub mod notify;
pub mod progress;
pub mod project;
pub mod queries;
pub mod review_coordinator;
pub mod team_guard;
pub mod team_join;
