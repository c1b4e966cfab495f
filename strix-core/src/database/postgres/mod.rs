//! PostgreSQL-backed repository implementations.
//!
//! All queries use the runtime-checked sqlx API so the workspace builds
//! without a live database.

pub mod jobs;
pub mod users;
