//! Shared utilities.
//!
//! - [`errors`]: application error type and HTTP mapping
//! - [`password`]: bcrypt password hashing and verification

pub mod errors;
pub mod password;
