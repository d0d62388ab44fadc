//! Identity primitives.
//!
//! - [`jwt`] -- HS256 access-token generation and validation. Tokens are issued
//!   by the external identity provider; [`jwt::generate_access_token`] exists
//!   for tooling and tests.

pub mod jwt;
