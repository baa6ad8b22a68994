//! Identity primitives.
//!
//! Users and login live in an external identity provider. This service only
//! verifies the HS256 access tokens it issues.

pub mod jwt;
