//! Well-known role name constants.
//!
//! Roles are issued by the identity provider and embedded in the access
//! token; this service only compares against them.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";
