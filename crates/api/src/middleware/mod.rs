//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller's identity from a JWT Bearer token.
//! - [`rbac::RequireStudent`] -- Requires the `student` role.
//! - [`rbac::RequireStaff`] -- Requires the `staff` role.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.

pub mod auth;
pub mod rbac;
