//! Environment-driven configuration.
//!
//! Each submodule covers one concern and loads itself from environment
//! variables, with sensible development defaults where a value is optional.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `CORS_ALLOWED_ORIGINS`: comma-separated list of allowed origins
//! - `PORT`: HTTP listen port (default 3000)

pub mod cors;
pub mod database;
