//! Shared data models for the Strix reconnaissance platform.
//!
//! This crate is intentionally small: it holds the record types exchanged
//! between the scan core, the HTTP server and API clients, with optional
//! `serde` and `sqlx` support behind feature flags.

pub mod job;

pub use job::{ScanJob, ScanStatus};
